use std::cmp::Ordering;

use crate::data_loader::Team;

// Team indices ordered by t_var, highest first. Equal values fall back to name order so output is deterministic.
// The closure lets one function serve both the rating and the schedule ordering.
pub fn order_by_desc<F>(teams: &[Team], t_var: F) -> Vec<usize> where
    F: Fn(&Team) -> f64 {
    let mut order: Vec<usize> = (0..teams.len()).collect();

    order.sort_by(|&a, &b| {
        t_var(&teams[b])
            .total_cmp(&t_var(&teams[a]))
            .then_with(|| teams[a].name.cmp(&teams[b].name))
    });
    order
}

// Places for values already sorted best first. A value equal to the previous one copies its place,
// so every member of a tied run gets the run's first position.
pub fn tied_places(sorted_values: &[f64]) -> Vec<usize> {
    let mut places = Vec::with_capacity(sorted_values.len());
    let mut last: Option<(f64, usize)> = None;

    for (pos, &value) in sorted_values.iter().enumerate() {
        let place = match last {
            Some((prev, place)) if prev.partial_cmp(&value) == Some(Ordering::Equal) => place,
            _ => pos + 1,
        };
        places.push(place);
        last = Some((value, place));
    }

    places
}

pub fn win_pct(wins: u32, losses: u32) -> f64 {
    if wins + losses == 0 { return 0.0; }
    wins as f64 / (wins + losses) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str, rating: f64) -> Team {
        Team::new(name.to_string(), rating)
    }

    #[test]
    fn places_share_first_position() {
        assert_eq!(tied_places(&[9.0, 8.0, 8.0, 8.0, 7.0, 7.0, 1.0]), vec![1, 2, 2, 2, 5, 5, 7]);
        assert_eq!(tied_places(&[3.0, 3.0, 3.0]), vec![1, 1, 1]);
        assert_eq!(tied_places(&[]), Vec::<usize>::new());
    }

    #[test]
    fn order_is_descending_then_by_name() {
        let teams = vec![team("Yale", 40.0), team("Army", 55.5), team("Navy", 55.5), team("Brown", 61.0)];
        assert_eq!(order_by_desc(&teams, |t| t.rating), vec![3, 1, 2, 0]);
    }

    #[test]
    fn pct_handles_empty_record() {
        assert_eq!(win_pct(0, 0), 0.0);
        assert_eq!(win_pct(3, 1), 0.75);
    }
}

use rand::Rng;

use quiz_core::model::Question;

/// Draw `min(n, items.len())` items without replacement, in uniformly random order.
///
/// Runs Fisher–Yates over a copy of `items` (from the last index down to 1,
/// swapping with a uniform index in `0..=i`) and keeps the first `n`.
/// `items` itself is left untouched.
pub fn sample<T: Clone, R: Rng + ?Sized>(items: &[T], n: usize, rng: &mut R) -> Vec<T> {
    if n == 0 || items.is_empty() {
        return Vec::new();
    }

    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled.truncate(n);
    shuffled
}

/// Pick up to `count` questions belonging to `module`.
pub(crate) fn plan_questions<R: Rng + ?Sized>(
    all: &[Question],
    module: &str,
    count: usize,
    rng: &mut R,
) -> Vec<Question> {
    let matching: Vec<Question> = all.iter().filter(|q| q.module() == module).cloned().collect();
    sample(&matching, count, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Difficulty;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn build_question(module: &str, n: usize) -> Question {
        Question::new(
            module,
            "General",
            Difficulty::Basic,
            format!("{module} #{n}"),
            vec!["a".into(), "b".into()],
            0,
        )
        .unwrap()
    }

    #[test]
    fn sample_length_is_min_of_n_and_len() {
        let items: Vec<u32> = (0..7).collect();
        let mut rng = StdRng::seed_from_u64(7);
        for n in 0..12 {
            let picked = sample(&items, n, &mut rng);
            assert_eq!(picked.len(), n.min(items.len()));

            let distinct: HashSet<_> = picked.iter().collect();
            assert_eq!(distinct.len(), picked.len());
            assert!(picked.iter().all(|p| items.contains(p)));
        }
    }

    #[test]
    fn sample_does_not_mutate_input() {
        let items = vec!["a", "b", "c", "d"];
        let before = items.clone();
        let _ = sample(&items, 3, &mut StdRng::seed_from_u64(1));
        assert_eq!(items, before);
    }

    #[test]
    fn empty_input_or_zero_count_yields_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(sample::<u8, _>(&[], 5, &mut rng).is_empty());
        assert!(sample(&[1, 2, 3], 0, &mut rng).is_empty());
    }

    #[test]
    fn repeated_draws_change_order() {
        let items: Vec<u32> = (0..10).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let orders: HashSet<Vec<u32>> = (0..20).map(|_| sample(&items, 10, &mut rng)).collect();
        assert!(orders.len() > 1);
    }

    #[test]
    fn every_position_is_reachable() {
        let items = [0_u8, 1, 2];
        let mut rng = StdRng::seed_from_u64(99);
        let mut firsts = HashSet::new();
        for _ in 0..200 {
            firsts.insert(sample(&items, 1, &mut rng)[0]);
        }
        assert_eq!(firsts.len(), 3);
    }

    #[test]
    fn plan_filters_by_module_and_clamps_count() {
        let all = vec![
            build_question("Property", 1),
            build_question("Life", 1),
            build_question("Property", 2),
            build_question("Property", 3),
            build_question("Auto", 1),
        ];
        let picked = plan_questions(&all, "Property", 10, &mut StdRng::seed_from_u64(5));
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|q| q.module() == "Property"));

        let none = plan_questions(&all, "Health", 10, &mut StdRng::seed_from_u64(5));
        assert!(none.is_empty());
    }
}

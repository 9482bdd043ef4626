use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Seed derived from the first 64 bits of SHA-256 over `parts` joined by `::`.
pub fn stable_seed(parts: &[&str]) -> u64 {
    let digest = Sha256::digest(parts.join("::").as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

pub trait Weighted {
    fn weight(&self) -> i64;
}

/// Weights are clamped to `1..=u32::MAX` so the running total always fits a `u64`.
fn clamped_weight<T: Weighted>(entry: &T) -> u64 {
    entry.weight().clamp(1, u32::MAX as i64) as u64
}

/// Pick an entry with probability proportional to its weight.
pub fn weighted_choice<'a, T: Weighted, R: Rng>(rng: &mut R, entries: &'a [T]) -> Option<&'a T> {
    if entries.is_empty() {
        return None;
    }

    let total = entries
        .iter()
        .fold(0u64, |sum, e| sum.saturating_add(clamped_weight(e)));
    let pick = rng.gen_range(1..=total);
    let mut running = 0u64;
    for entry in entries {
        running = running.saturating_add(clamped_weight(entry));
        if pick <= running {
            return Some(entry);
        }
    }
    entries.last()
}

pub(crate) fn pick_line(lines: &[String], seed: u64) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Some(lines[rng.gen_range(0..lines.len())].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entry(&'static str, i64);

    impl Weighted for Entry {
        fn weight(&self) -> i64 {
            self.1
        }
    }

    #[test]
    fn test_stable_seed_is_deterministic() {
        assert_eq!(stable_seed(&["morning", "2026-02-21"]), stable_seed(&["morning", "2026-02-21"]));
        assert_ne!(stable_seed(&["morning", "2026-02-21"]), stable_seed(&["evening", "2026-02-21"]));
        // "a::b" and ["a", "b"] hash the same input
        assert_eq!(stable_seed(&["a::b"]), stable_seed(&["a", "b"]));
    }

    #[test]
    fn test_weighted_choice_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let entries: Vec<Entry> = Vec::new();
        assert!(weighted_choice(&mut rng, &entries).is_none());
    }

    #[test]
    fn test_weighted_choice_clamps_weights() {
        let entries = vec![Entry("never-zero", 0), Entry("heavy", 1000)];
        let mut rng = StdRng::seed_from_u64(42);
        let mut light_hits = 0;
        for _ in 0..5000 {
            if weighted_choice(&mut rng, &entries).unwrap().0 == "never-zero" {
                light_hits += 1;
            }
        }
        // weight 0 behaves like weight 1: rare, but possible
        assert!(light_hits < 50);
    }

    #[test]
    fn test_weighted_choice_survives_huge_weights() {
        let entries = vec![Entry("a", i64::MAX), Entry("b", i64::MAX), Entry("c", -7)];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(weighted_choice(&mut rng, &entries).is_some());
        }
    }

    #[test]
    fn test_pick_line_is_stable_per_seed() {
        let lines: Vec<String> = (0..10).map(|i| format!("line {}", i)).collect();
        assert_eq!(pick_line(&lines, 99), pick_line(&lines, 99));
        assert!(pick_line(&[], 99).is_none());
    }
}

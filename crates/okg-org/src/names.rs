//! Name tables for roster generation

use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashSet;

const FIRST_NAMES: [&str; 22] = [
    "Aakash", "Aditi", "Arjun", "Ananya", "Deepak", "Divya", "Gaurav", "Ishita", "Karan", "Kavya",
    "Manoj", "Meera", "Nikhil", "Priya", "Rahul", "Rina", "Sanjay", "Shreya", "Suresh", "Tanya",
    "Vijay", "Zara",
];

const LAST_NAMES: [&str; 17] = [
    "Agarwal", "Bansal", "Chopra", "Desai", "Gupta", "Jain", "Kapoor", "Kumar", "Malhotra",
    "Nair", "Patel", "Reddy", "Sharma", "Singh", "Tiwari", "Verma", "Yadav",
];

/// Draws unique full names from the name tables
#[derive(Debug, Default)]
pub struct NamePool {
    used: HashSet<String>,
}

impl NamePool {
    /// Create an empty pool
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a name not handed out before
    pub fn draw(&mut self, rng: &mut StdRng) -> String {
        for _ in 0..1024 {
            let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
            let name = format!("{first} {last}");
            if self.used.insert(name.clone()) {
                return name;
            }
        }
        // Table exhausted; disambiguate deterministically
        let n = self.used.len() + 1;
        let name = format!("{} {} {n}", FIRST_NAMES[0], LAST_NAMES[0]);
        self.used.insert(name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use okg_calendar::unit_rng;

    #[test]
    fn names_are_unique() {
        let mut pool = NamePool::new();
        let mut rng = unit_rng(42, "names", 0);
        let names: HashSet<String> = (0..50).map(|_| pool.draw(&mut rng)).collect();
        assert_eq!(names.len(), 50);
    }

    #[test]
    fn names_are_reproducible() {
        let run = || {
            let mut pool = NamePool::new();
            let mut rng = unit_rng(7, "names", 0);
            (0..10).map(|_| pool.draw(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}

use hashbrown::{HashMap, HashSet};

/// Assigns unique column names in file order.
///
/// The first column with a given name keeps it. Every later column with the
/// same base name gets `_2`, `_3`, ... appended, counting per base name. If a
/// generated name is already taken (a file that has both `PART_NO`, `PART_NO`
/// and a real `PART_NO_2` column), the counter keeps going until the name is
/// free, so the result is always unique.
///
/// # Examples
///
/// ```
/// # use roll_search::utils::column_pool::ColumnPool;
/// let mut pool = ColumnPool::new();
/// assert_eq!(pool.intern("PART_NO"), "PART_NO");
/// assert_eq!(pool.intern("SECTION_NO"), "SECTION_NO");
/// assert_eq!(pool.intern("PART_NO"), "PART_NO_2");
/// assert_eq!(pool.intern("PART_NO"), "PART_NO_3");
/// assert_eq!(pool.renamed(), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ColumnPool {
    pub strings: Vec<String>,
    taken: HashSet<String>,
    occurrences: HashMap<String, u32>,
    renamed: usize,
}

impl ColumnPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the unique name for the next column called `column_name`.
    pub fn intern(&mut self, column_name: &str) -> String {
        let seen = self.occurrences.entry(column_name.to_string()).or_insert(0);
        *seen += 1;

        let mut unique = if *seen == 1 && !self.taken.contains(column_name) {
            column_name.to_string()
        } else {
            self.renamed += 1;
            format!("{}_{}", column_name, (*seen).max(2))
        };

        while self.taken.contains(&unique) {
            *seen += 1;
            unique = format!("{}_{}", column_name, *seen);
        }

        self.taken.insert(unique.clone());
        self.strings.push(unique.clone());
        unique
    }

    /// Number of columns that did not keep their original name.
    pub fn renamed(&self) -> usize {
        self.renamed
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.strings.get(idx).map(|s| s.as_str())
    }
}

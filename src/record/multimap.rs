use std::collections::HashMap;

/// Ordered multi-map for fields that may carry more than one value per name
/// (HTTP headers, query parameters).
///
/// Adding a value for an existing key appends to that key's value list;
/// nothing is ever replaced implicitly. Absent keys read as empty, never as
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiValueMap {
    entries: Vec<(String, Vec<String>)>,
}

impl MultiValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the key's value list, creating the key if absent.
    pub fn add(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Appends each element of `values` individually, preserving order.
    pub fn add_all<I>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        let key = key.into();
        for value in values {
            self.add(key.clone(), value);
        }
    }

    /// All values recorded for `key`, in insertion order. Empty if absent.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(&[], |(_, values)| values.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Replaces the key's entire value list with the single `value`. The
    /// key keeps its position; an absent key is appended.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => *values = vec![value],
            None => self.entries.push((key.to_string(), vec![value])),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One string per key, values joined with `,` in insertion order.
    pub fn flatten(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .map(|(key, values)| (key.clone(), values.join(",")))
            .collect()
    }
}

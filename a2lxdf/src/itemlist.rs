use crate::A2lObjectName;
use fnv::FnvBuildHasher;
use std::{collections::HashMap, ops::Index};

/// A table of named a2l statements
///
/// An ItemList is an ordered collection of items, which additionally allows for
/// fast access to items by their name. The position of an item is its table index;
/// indices are assigned sequentially as items are inserted.
#[derive(Debug, Clone)]
pub struct ItemList<T: A2lObjectName> {
    // storage for items
    items: Vec<T>,
    // mapping from item name to index in the items vector
    map: HashMap<String, usize, FnvBuildHasher>,
}

impl<T: A2lObjectName> ItemList<T> {
    /// create a new ItemList
    pub fn new() -> Self {
        Self {
            items: vec![],
            map: HashMap::default(),
        }
    }

    /// insert an item into the ItemList
    ///
    /// If an item with the same name already exists, the new item replaces it and takes over
    /// its index. The replaced item is returned.
    pub fn insert(&mut self, value: T) -> Option<T> {
        if let Some(&index) = self.map.get(value.get_name()) {
            Some(std::mem::replace(&mut self.items[index], value))
        } else {
            let index = self.items.len();
            self.map.insert(value.get_name().to_string(), index);
            self.items.push(value);
            None
        }
    }

    /// get an item by key
    pub fn get(&self, key: &str) -> Option<&T> {
        let index = self.map.get(key)?;
        Some(&self.items[*index])
    }

    /// get the index of an item by key
    pub fn index(&self, key: &str) -> Option<usize> {
        self.map.get(key).copied()
    }

    /// Checks if the ItemList contains an item with the given key
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Returns an iterator over references to the items in the ItemList
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Returns the number of items in the ItemList
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the ItemList is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for ItemList<T>
where
    T: A2lObjectName,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: A2lObjectName> Index<usize> for ItemList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a ItemList<T>
where
    T: A2lObjectName,
{
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> PartialEq for ItemList<T>
where
    T: A2lObjectName + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
        // no need to compare the maps, as they are derived from the items
    }
}

use std::collections::HashMap;
use std::collections::hash_map;

/// Color channels in the order they were declared (R, G, B).
///
/// Values are kept as loaded; nothing checks that they fit in a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub i64, pub i64, pub i64);

impl Rgb {
    pub fn as_tuple(&self) -> (i64, i64, i64) {
        (self.0, self.1, self.2)
    }

    /// Converts to an 8-bit pixel, or `None` when a channel is outside 0..=255.
    pub fn to_rgb8(&self) -> Option<image::Rgb<u8>> {
        let r = u8::try_from(self.0).ok()?;
        let g = u8::try_from(self.1).ok()?;
        let b = u8::try_from(self.2).ok()?;
        Some(image::Rgb([r, g, b]))
    }
}

impl From<(i64, i64, i64)> for Rgb {
    fn from((r, g, b): (i64, i64, i64)) -> Self {
        Rgb(r, g, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassEntry {
    pub color: Rgb,
    pub id: i64,
}

impl ClassEntry {
    pub fn new(color: impl Into<Rgb>, id: i64) -> Self {
        Self {
            color: color.into(),
            id,
        }
    }
}

/// Class name -> (color, id) for one `class_<N>` section.
///
/// Built fresh by every load. Names are unique; ids and colors may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColormapTable {
    classes: HashMap<String, ClassEntry>,
}

impl ColormapTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `name`, replacing and returning any earlier entry under it.
    pub fn insert(&mut self, name: impl Into<String>, entry: ClassEntry) -> Option<ClassEntry> {
        self.classes.insert(name.into(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&ClassEntry> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, ClassEntry> {
        self.classes.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Looks up a class by id. When several names share an id the
    /// alphabetically first one wins, so the answer does not depend on hash order.
    pub fn name_for_id(&self, id: i64) -> Option<&str> {
        self.classes
            .iter()
            .filter(|(_, entry)| entry.id == id)
            .map(|(name, _)| name.as_str())
            .min()
    }

    pub fn color_for_id(&self, id: i64) -> Option<Rgb> {
        let name = self.name_for_id(id)?;
        self.classes.get(name).map(|entry| entry.color)
    }

    /// Entries ordered by id, ties broken by name.
    pub fn sorted_by_id(&self) -> Vec<(&str, &ClassEntry)> {
        let mut entries: Vec<(&str, &ClassEntry)> = self
            .classes
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        entries.sort_by(|a, b| a.1.id.cmp(&b.1.id).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn into_inner(self) -> HashMap<String, ClassEntry> {
        self.classes
    }
}

impl FromIterator<(String, ClassEntry)> for ColormapTable {
    fn from_iter<I: IntoIterator<Item = (String, ClassEntry)>>(iter: I) -> Self {
        let mut table = ColormapTable::new();
        for (name, entry) in iter {
            table.insert(name, entry);
        }
        table
    }
}

impl IntoIterator for ColormapTable {
    type Item = (String, ClassEntry);
    type IntoIter = hash_map::IntoIter<String, ClassEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ColormapTable {
    type Item = (&'a String, &'a ClassEntry);
    type IntoIter = hash_map::Iter<'a, String, ClassEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.iter()
    }
}

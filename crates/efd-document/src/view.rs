use crate::document::Document;

/// Iterator over the ancestors of a record, innermost first.
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<usize>,
}

impl Iterator for Ancestors<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

impl Document {
    /// Positions of the ancestors of `position`, innermost first.
    pub fn ancestors(&self, position: usize) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(position),
        }
    }

    /// `position` and all its descendants in emission order.
    pub fn subtree(&self, position: usize) -> Vec<usize> {
        if position >= self.len() {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut pending = vec![position];
        while let Some(current) = pending.pop() {
            out.push(current);
            pending.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Positions of records without a parent.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|&position| self.parent(position).is_none())
    }
}

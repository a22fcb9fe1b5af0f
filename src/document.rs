use egui::Rect;

use crate::element::Element;

/// Describes what a scene mutation did, so observers can update incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneChange {
    Added { index: usize },
    Removed { index: usize },
    Reordered { old_index: usize, new_index: usize },
    ContentChanged { index: usize },
    Cleared,
    /// The whole element list was swapped out (fill, crop, undo...)
    Replaced,
}

/// Ordered element list. Index order is paint order, the last element is on top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    elements: Vec<Element>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// In-place access for live gestures. Callers report the edit themselves.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.elements.get_mut(index)
    }

    pub fn append(&mut self, element: Element) -> SceneChange {
        self.elements.push(element);
        SceneChange::Added {
            index: self.elements.len() - 1,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<SceneChange> {
        if index >= self.elements.len() {
            return None;
        }
        self.elements.remove(index);
        Some(SceneChange::Removed { index })
    }

    /// Move an element to a new paint position. `new_index` is clamped to the
    /// last slot; moving onto itself is a no-op.
    pub fn move_to_index(&mut self, index: usize, new_index: usize) -> Option<SceneChange> {
        if index >= self.elements.len() {
            return None;
        }
        let new_index = new_index.min(self.elements.len() - 1);
        if new_index == index {
            return None;
        }
        let element = self.elements.remove(index);
        self.elements.insert(new_index, element);
        Some(SceneChange::Reordered {
            old_index: index,
            new_index,
        })
    }

    pub fn bring_to_front(&mut self, index: usize) -> Option<SceneChange> {
        self.move_to_index(index, usize::MAX)
    }

    pub fn send_to_back(&mut self, index: usize) -> Option<SceneChange> {
        self.move_to_index(index, 0)
    }

    pub fn clear(&mut self) -> SceneChange {
        self.elements.clear();
        SceneChange::Cleared
    }

    pub fn replace_with(&mut self, elements: Vec<Element>) -> SceneChange {
        self.elements = elements;
        SceneChange::Replaced
    }

    pub fn bounds_of(&self, index: usize) -> Option<Rect> {
        self.elements.get(index).map(Element::bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Style, factory};
    use egui::{Vec2, pos2};

    fn rect_at(x: f32) -> Element {
        factory::create_rect(pos2(x, 0.0), Vec2::splat(5.0), Style::default())
    }

    #[test]
    fn move_to_index_changes_order_only() {
        let mut scene = Scene::from_elements(vec![rect_at(0.0), rect_at(1.0), rect_at(2.0)]);
        let change = scene.move_to_index(0, 2);
        assert_eq!(
            change,
            Some(SceneChange::Reordered {
                old_index: 0,
                new_index: 2
            })
        );
        assert_eq!(scene.bounds_of(2).map(|r| r.min.x), Some(0.0));
        assert_eq!(scene.bounds_of(0).map(|r| r.min.x), Some(1.0));
    }

    #[test]
    fn bring_to_front_and_send_to_back() {
        let mut scene = Scene::from_elements(vec![rect_at(0.0), rect_at(1.0), rect_at(2.0)]);
        scene.bring_to_front(0);
        assert_eq!(scene.bounds_of(2).map(|r| r.min.x), Some(0.0));
        scene.send_to_back(2);
        assert_eq!(scene.bounds_of(0).map(|r| r.min.x), Some(0.0));
        assert_eq!(scene.send_to_back(0), None);
    }

    #[test]
    fn out_of_range_edits_are_ignored() {
        let mut scene = Scene::from_elements(vec![rect_at(0.0)]);
        assert_eq!(scene.remove(3), None);
        assert_eq!(scene.move_to_index(3, 0), None);
        assert_eq!(scene.len(), 1);
    }
}

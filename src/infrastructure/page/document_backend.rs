use crate::domain::models::page_models::{DocumentError, Element, ElementId};
use crate::domain::traits::page_traits::Document;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// How `exec_copy` behaves, mirroring what `execCommand("copy")` can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecCopyBehavior {
    Succeed,
    /// The command runs but reports `false`.
    Refuse,
    /// The command throws.
    Fail,
}

#[derive(Debug, Clone)]
pub struct RenderedElement {
    pub id: ElementId,
    pub element: Element,
    pub faded: bool,
    seq: u64,
}

/// A page DOM kept in memory. Records everything the core renders.
pub struct MemoryDocument {
    instance_id: String,
    hostname: String,
    cookie: Mutex<String>,
    elements: DashMap<ElementId, RenderedElement>,
    seq: AtomicU64,
    selection: Mutex<Option<ElementId>>,
    exec_copy: Mutex<ExecCopyBehavior>,
    copied: Mutex<Vec<String>>,
    detached: AtomicBool,
}

impl Document for MemoryDocument {
    fn instance_id(&self) -> String {
        self.instance_id.clone()
    }

    fn cookie_string(&self) -> String {
        lock(&self.cookie).clone()
    }

    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn append(&self, element: Element) -> Result<ElementId, DocumentError> {
        if self.detached.load(Ordering::SeqCst) {
            return Err(DocumentError::NoBody);
        }
        let id = ElementId(Uuid::new_v4().to_string());
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.elements.insert(
            id.clone(),
            RenderedElement {
                id: id.clone(),
                element,
                faded: false,
                seq,
            },
        );
        Ok(id)
    }

    fn remove(&self, id: &ElementId) -> bool {
        let mut selection = lock(&self.selection);
        if selection.as_ref() == Some(id) {
            *selection = None;
        }
        self.elements.remove(id).is_some()
    }

    fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    fn fade_out(&self, id: &ElementId) {
        if let Some(mut rendered) = self.elements.get_mut(id) {
            rendered.faded = true;
        }
    }

    fn select(&self, id: &ElementId) -> Result<(), DocumentError> {
        match self.elements.get(id) {
            Some(rendered) if matches!(rendered.element, Element::ScratchText { .. }) => {
                *lock(&self.selection) = Some(id.clone());
                Ok(())
            }
            _ => Err(DocumentError::ElementNotFound(id.to_string())),
        }
    }

    fn exec_copy(&self) -> Result<bool, DocumentError> {
        match *lock(&self.exec_copy) {
            ExecCopyBehavior::Fail => {
                Err(DocumentError::Operation("execCommand is not supported".to_string()))
            }
            ExecCopyBehavior::Refuse => Ok(false),
            ExecCopyBehavior::Succeed => {
                let selected = lock(&self.selection).clone();
                let text = selected
                    .and_then(|id| self.elements.get(&id).map(|r| r.element.clone()))
                    .and_then(|element| match element {
                        Element::ScratchText { value } => Some(value),
                        _ => None,
                    });

                match text {
                    Some(text) => {
                        lock(&self.copied).push(text);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }
}

impl MemoryDocument {
    pub fn new(hostname: &str, cookie: &str) -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
            hostname: hostname.to_string(),
            cookie: Mutex::new(cookie.to_string()),
            elements: DashMap::new(),
            seq: AtomicU64::new(0),
            selection: Mutex::new(None),
            exec_copy: Mutex::new(ExecCopyBehavior::Succeed),
            copied: Mutex::new(Vec::new()),
            detached: AtomicBool::new(false),
        }
    }

    /// Simulates a page whose `<body>` is gone: nothing can be appended.
    pub fn detach_body(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    pub fn set_cookie_string(&self, cookie: &str) {
        *lock(&self.cookie) = cookie.to_string();
    }

    pub fn set_exec_copy(&self, behavior: ExecCopyBehavior) {
        *lock(&self.exec_copy) = behavior;
    }

    /// Everything currently in the page, oldest first.
    pub fn rendered(&self) -> Vec<RenderedElement> {
        let mut rendered: Vec<RenderedElement> =
            self.elements.iter().map(|entry| entry.value().clone()).collect();
        rendered.sort_by_key(|r| r.seq);
        rendered
    }

    pub fn floating_controls(&self) -> usize {
        self.rendered()
            .iter()
            .filter(|r| r.element.is_floating_control())
            .count()
    }

    pub fn notifications(&self) -> Vec<RenderedElement> {
        self.rendered()
            .into_iter()
            .filter(|r| r.element.is_notification())
            .collect()
    }

    /// Texts that reached the clipboard through `exec_copy`.
    pub fn copied(&self) -> Vec<String> {
        lock(&self.copied).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_copy() {
        let document = MemoryDocument::new("example.com", "a=1");
        let id = document
            .append(Element::ScratchText {
                value: "a=1".to_string(),
            })
            .unwrap();

        document.select(&id).unwrap();
        assert!(document.exec_copy().unwrap());
        assert!(document.remove(&id));
        assert!(!document.remove(&id));
        assert_eq!(document.copied(), vec!["a=1".to_string()]);
    }

    #[test]
    fn test_detached_body_rejects_appends() {
        let document = MemoryDocument::new("example.com", "");
        document.detach_body();

        let result = document.append(Element::ScratchText {
            value: "a=1".to_string(),
        });
        assert!(matches!(result, Err(DocumentError::NoBody)));
        assert!(document.rendered().is_empty());
    }

    #[test]
    fn test_select_requires_scratch() {
        let document = MemoryDocument::new("example.com", "");
        let id = document
            .append(Element::FloatingControl {
                label: "c".to_string(),
                title: "t".to_string(),
            })
            .unwrap();
        assert!(document.select(&id).is_err());
        assert_eq!(document.floating_controls(), 1);
    }

    #[test]
    fn test_exec_copy_without_selection() {
        let document = MemoryDocument::new("example.com", "");
        assert!(!document.exec_copy().unwrap());

        document.set_exec_copy(ExecCopyBehavior::Fail);
        assert!(document.exec_copy().is_err());
    }
}

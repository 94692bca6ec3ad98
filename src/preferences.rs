// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Dashboard Canvas Effects ("The Backdrop") - Preferences Context

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::disposer::Disposer;

// ─── Theme & Palette ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Self::Dark => Palette {
                primary: "#00d4ff".to_string(),
                accent: "#00ff88".to_string(),
                muted: "#1e3a5f".to_string(),
                text: "#8899aa".to_string(),
                raw: "#ff6b6b".to_string(),
                analyzed: "#ffd93d".to_string(),
                stored: "#6bcb77".to_string(),
            },
            Self::Light => Palette {
                primary: "#0077b6".to_string(),
                accent: "#2a9d8f".to_string(),
                muted: "#b8c4d0".to_string(),
                text: "#334455".to_string(),
                raw: "#d62828".to_string(),
                analyzed: "#e09f3e".to_string(),
                stored: "#2b9348".to_string(),
            },
        }
    }
}

/// Colour set a simulator draws with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub accent: String,
    pub muted: String,
    pub text: String,
    pub raw: String,
    pub analyzed: String,
    pub stored: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    /// When set, mounted animations keep rendering but stop advancing.
    pub reduced_motion: bool,
}

// ─── PreferenceStore ─────────────────────────────────────────────────────────

type Observer = Rc<RefCell<dyn FnMut(&Preferences)>>;

struct StoreInner {
    prefs: Preferences,
    observers: Vec<(u64, Observer)>,
    next_id: u64,
}

/// Application-root-owned preferences, passed by reference to each view.
///
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct PreferenceStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

impl PreferenceStore {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                prefs,
                observers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    pub fn get(&self) -> Preferences {
        self.inner.borrow().prefs
    }

    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Register `callback` for change notifications. The returned disposer
    /// unsubscribes; the callback is not invoked for the current value.
    pub fn subscribe(&self, callback: impl FnMut(&Preferences) + 'static) -> Disposer {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.push((id, Rc::new(RefCell::new(callback))));
            id
        };
        let weak: Weak<RefCell<StoreInner>> = Rc::downgrade(&self.inner);
        Disposer::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().observers.retain(|(oid, _)| *oid != id);
            }
        })
    }

    pub fn set_theme(&self, theme: Theme) {
        self.update(|p| p.theme = theme);
    }

    pub fn set_reduced_motion(&self, reduced: bool) {
        self.update(|p| p.reduced_motion = reduced);
    }

    /// Apply `change` and notify observers if anything changed.
    pub fn update(&self, change: impl FnOnce(&mut Preferences)) {
        let (prefs, observers) = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.prefs;
            change(&mut inner.prefs);
            if inner.prefs == before {
                return;
            }
            let observers: Vec<Observer> =
                inner.observers.iter().map(|(_, o)| o.clone()).collect();
            (inner.prefs, observers)
        };
        // Called outside the borrow so observers may subscribe or unsubscribe.
        for observer in observers {
            (&mut *observer.borrow_mut())(&prefs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn observers_see_changes_until_unsubscribed() {
        let store = PreferenceStore::default();
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let mut sub = store.subscribe(move |p| {
            assert_eq!(p.theme, Theme::Light);
            s.set(s.get() + 1);
        });
        store.set_theme(Theme::Light);
        assert_eq!(seen.get(), 1);

        // No-op change does not notify.
        store.set_theme(Theme::Light);
        assert_eq!(seen.get(), 1);

        sub.dispose();
        assert_eq!(store.observer_count(), 0);
        store.set_theme(Theme::Dark);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn disposer_outliving_store_is_harmless() {
        let store = PreferenceStore::default();
        let sub = store.subscribe(|_| {});
        drop(store);
        drop(sub);
    }

    #[test]
    fn theme_names_parse() {
        assert_eq!(Theme::from_name("LIGHT"), Some(Theme::Light));
        assert_eq!(Theme::from_name("dark"), Some(Theme::Dark));
        assert_eq!(Theme::from_name("sepia"), None);
        assert_ne!(Theme::Dark.palette(), Theme::Light.palette());
    }
}

//! Modifier key tracking
//!
//! The image preview only appears while the link modifier (Ctrl, or Cmd on
//! macOS) is held. Instead of a global flag, a [`KeyStateObserver`]
//! subscribes to the editor view's [`InputHub`] when it is created and
//! unsubscribes when it is dropped. Consumers only see it through the
//! [`ModifierState`] capability.

use log::debug;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ─────────────────────────────────────────────────────────────────────────────
// Input Events
// ─────────────────────────────────────────────────────────────────────────────

/// Modifier keys held during an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierKeys {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// Cmd on macOS
    pub command: bool,
}

impl ModifierKeys {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        command: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        command: false,
    };

    /// Whether the modifier that activates links and previews is held.
    pub fn is_link_modifier(&self) -> bool {
        self.ctrl || self.command
    }
}

impl From<egui::Modifiers> for ModifierKeys {
    fn from(modifiers: egui::Modifiers) -> Self {
        Self {
            ctrl: modifiers.ctrl,
            alt: modifiers.alt,
            shift: modifiers.shift,
            command: modifiers.mac_cmd,
        }
    }
}

/// Input events the hub distributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key went down; `modifiers` reflects the state after the press
    KeyDown { modifiers: ModifierKeys },
    /// A key went up; `modifiers` reflects the state after the release
    KeyUp { modifiers: ModifierKeys },
    /// The pointer moved
    PointerMove { modifiers: ModifierKeys },
}

impl InputEvent {
    pub fn modifiers(&self) -> ModifierKeys {
        match self {
            InputEvent::KeyDown { modifiers }
            | InputEvent::KeyUp { modifiers }
            | InputEvent::PointerMove { modifiers } => *modifiers,
        }
    }

    /// Translate an egui event. Events that carry no modifier information
    /// yield `None`.
    pub fn from_egui(event: &egui::Event, modifiers: egui::Modifiers) -> Option<Self> {
        match event {
            egui::Event::Key {
                pressed: true,
                modifiers,
                ..
            } => Some(InputEvent::KeyDown {
                modifiers: (*modifiers).into(),
            }),
            egui::Event::Key {
                pressed: false,
                modifiers,
                ..
            } => Some(InputEvent::KeyUp {
                modifiers: (*modifiers).into(),
            }),
            egui::Event::PointerMoved(_) => Some(InputEvent::PointerMove {
                modifiers: modifiers.into(),
            }),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Input Hub
// ─────────────────────────────────────────────────────────────────────────────

type Listener = Rc<dyn Fn(&InputEvent)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Per-view event hub. Cloning shares the same listener list.
#[derive(Clone, Default)]
pub struct InputHub {
    listeners: Rc<RefCell<Listeners>>,
}

impl InputHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; it stays registered until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&InputEvent) + 'static,
    {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Rc::new(listener)));
        debug!("Input listener {} subscribed", id);
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Deliver `event` to every listener.
    pub fn emit(&self, event: InputEvent) {
        // Snapshot so listeners may subscribe or unsubscribe while handling
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            listener(&event);
        }
    }

    /// Forward this frame's egui input.
    pub fn forward_egui(&self, input: &egui::InputState) {
        for event in &input.events {
            if let Some(event) = InputEvent::from_egui(event, input.modifiers) {
                self.emit(event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

impl std::fmt::Debug for InputHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle returned by [`InputHub::subscribe`]; unsubscribes on drop.
pub struct Subscription {
    id: u64,
    listeners: std::rc::Weak<RefCell<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().entries.retain(|(id, _)| *id != self.id);
            debug!("Input listener {} unsubscribed", self.id);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Modifier State
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only view of whether the link modifier is held.
pub trait ModifierState {
    fn is_modifier_pressed(&self) -> bool;
}

/// Tracks the link modifier from key and pointer events.
pub struct KeyStateObserver {
    pressed: Rc<Cell<bool>>,
    _subscription: Subscription,
}

impl KeyStateObserver {
    pub fn new(hub: &InputHub) -> Self {
        let pressed = Rc::new(Cell::new(false));
        let state = Rc::clone(&pressed);
        let subscription = hub.subscribe(move |event| {
            state.set(event.modifiers().is_link_modifier());
        });
        Self {
            pressed,
            _subscription: subscription,
        }
    }
}

impl ModifierState for KeyStateObserver {
    fn is_modifier_pressed(&self) -> bool {
        self.pressed.get()
    }
}

/// A fixed modifier state, for hosts that track keys themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedModifier(pub bool);

impl ModifierState for FixedModifier {
    fn is_modifier_pressed(&self) -> bool {
        self.0
    }
}

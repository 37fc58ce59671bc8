use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{LoxError, Result};
use crate::resolver::SlotId;
use crate::token::Token;
use crate::value::Value;

/// One lexical scope's storage, keyed by slot.
#[derive(Default)]
pub struct Frame {
    values: RefCell<HashMap<SlotId, Value>>,
    enclosing: Option<Rc<Frame>>,
}

// Frames can reach themselves through closures, so only the slots are shown.
impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut slots: Vec<SlotId> = self.values.borrow().keys().copied().collect();
        slots.sort();

        f.debug_struct("Frame")
            .field("slots", &slots)
            .field("enclosing", &self.enclosing.is_some())
            .finish()
    }
}

/// Handle to the innermost frame of a scope chain.  Cloning shares the frames.
#[derive(Debug, Clone, Default)]
pub struct FrameChain(Rc<Frame>);

impl FrameChain {
    /// A fresh empty frame on top of this chain.
    fn push(&self) -> FrameChain {
        FrameChain(Rc::new(Frame {
            values: RefCell::new(HashMap::new()),
            enclosing: Some(Rc::clone(&self.0)),
        }))
    }

    /// A new frame holding just `slot = value`, on top of this chain.
    pub fn extend(&self, slot: SlotId, value: Value) -> FrameChain {
        let chain = self.push();
        chain.0.values.borrow_mut().insert(slot, value);
        chain
    }

    fn find(&self, slot: SlotId) -> Option<&Frame> {
        let mut frame: &Frame = &self.0;

        loop {
            if frame.values.borrow().contains_key(&slot) {
                return Some(frame);
            }

            frame = frame.enclosing.as_deref()?;
        }
    }
}

/// Variable storage for a running program: slot‑keyed local frames plus the
/// name‑keyed global table.
#[derive(Debug)]
pub struct Environment {
    current: FrameChain,
    root: FrameChain,
    globals: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        let root = FrameChain::default();

        Environment {
            current: root.clone(),
            root,
            globals: HashMap::new(),
        }
    }

    // ───────────────────────── locals ─────────────────────────

    /// Bind `slot` in the innermost frame.
    pub fn define(&mut self, slot: SlotId, value: Value) {
        self.current.0.values.borrow_mut().insert(slot, value);
    }

    pub fn get(&self, slot: SlotId, name: &Token) -> Result<Value> {
        self.current
            .find(slot)
            .and_then(|frame| frame.values.borrow().get(&slot).cloned())
            .ok_or_else(|| undefined(name))
    }

    pub fn assign(&mut self, slot: SlotId, value: Value, name: &Token) -> Result<()> {
        let frame = self.current.find(slot).ok_or_else(|| undefined(name))?;
        frame.values.borrow_mut().insert(slot, value);
        Ok(())
    }

    // ───────────────────────── frames ─────────────────────────

    /// Push a fresh frame; hand the returned chain to [`restore`] on exit.
    ///
    /// [`restore`]: Environment::restore
    pub fn enter_scope(&mut self) -> FrameChain {
        let inner = self.current.push();
        std::mem::replace(&mut self.current, inner)
    }

    /// Make `previous` the current chain again.
    pub fn restore(&mut self, previous: FrameChain) {
        self.current = previous;
    }

    /// The current chain, for a closure to keep.
    pub fn capture(&self) -> FrameChain {
        self.current.clone()
    }

    /// Switch to a fresh frame on top of `chain` (a closure's frames).
    /// Returns the chain to [`restore`](Environment::restore) afterwards.
    pub fn graft(&mut self, chain: &FrameChain) -> FrameChain {
        std::mem::replace(&mut self.current, chain.push())
    }

    /// Drop every local frame, keeping globals.
    pub fn reset_scopes(&mut self) {
        self.current = self.root.clone();
    }

    // ───────────────────────── globals ────────────────────────

    pub fn define_global(&mut self, name: &str, value: Value) {
        self.globals.insert(name.to_string(), value);
    }

    pub fn get_global(&self, name: &Token) -> Result<Value> {
        self.globals
            .get(&name.lexeme)
            .cloned()
            .ok_or_else(|| undefined(name))
    }

    pub fn assign_global(&mut self, name: &Token, value: Value) -> Result<()> {
        match self.globals.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

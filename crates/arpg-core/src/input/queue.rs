/// Input events forwarded from the browser host.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A click/touch began at canvas coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// A key was pressed. `key_code` is the DOM `keyCode`.
    KeyDown { key_code: u32 },
    /// A key was released.
    KeyUp { key_code: u32 },
    /// A UI button press. `kind` identifies the button; `a`, `b`, `c` carry
    /// optional payload.
    Custom { kind: u32, a: f32, b: f32, c: f32 },
    /// Free-form text from a UI field (e.g. a datetime input).
    Text { kind: u32, text: String },
}

/// A queue of input events.
/// JS pushes events between frames; the runner drains them after each tick.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

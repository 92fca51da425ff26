/// Pointer lock/visibility the host applies to the OS cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerCapture {
    pub locked: bool,
    pub visible: bool,
}

impl Default for PointerCapture {
    fn default() -> Self {
        Self {
            locked: false,
            visible: true,
        }
    }
}

impl PointerCapture {
    /// Lock and hide the pointer for camera control.
    pub fn capture(&mut self) {
        if !self.locked {
            tracing::debug!("pointer captured");
        }
        self.locked = true;
        self.visible = false;
    }

    /// Unlock and show the pointer.
    pub fn release(&mut self) {
        if self.locked {
            tracing::debug!("pointer released");
        }
        self.locked = false;
        self.visible = true;
    }

    pub fn is_captured(&self) -> bool {
        self.locked
    }
}

use glam::Mat4;

/// Bounded stack of matrices with an always-present base entry.
///
/// `capacity` counts nested pushes; the push that would exceed it panics.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    owner: &'static str,
    capacity: usize,
    stack: Vec<Mat4>,
}

impl MatrixStack {
    pub fn new(owner: &'static str, capacity: usize) -> Self {
        let mut stack = Vec::with_capacity(capacity + 1);
        stack.push(Mat4::IDENTITY);
        Self { owner, capacity, stack }
    }

    /// Saves a copy of the top entry.
    pub fn push(&mut self) {
        assert!(
            self.depth() < self.capacity,
            "{}: matrix stack overflow (capacity {})",
            self.owner,
            self.capacity
        );
        let top = self.top();
        self.stack.push(top);
    }

    pub fn pop(&mut self) {
        assert!(self.depth() > 0, "{}: matrix stack underflow", self.owner);
        self.stack.pop();
    }

    #[inline]
    pub fn top(&self) -> Mat4 {
        *self.stack.last().unwrap_or(&Mat4::IDENTITY)
    }

    /// Number of nested pushes currently outstanding.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn load(&mut self, m: Mat4) {
        if let Some(top) = self.stack.last_mut() {
            *top = m;
        }
    }

    pub fn load_identity(&mut self) {
        self.load(Mat4::IDENTITY);
    }

    /// `top = m * top`
    pub fn pre_mult(&mut self, m: Mat4) {
        let top = self.top();
        self.load(m * top);
    }

    /// `top = top * m`
    pub fn post_mult(&mut self, m: Mat4) {
        let top = self.top();
        self.load(top * m);
    }
}

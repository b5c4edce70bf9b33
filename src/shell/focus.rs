/// Keeps keyboard focus inside a form: `Tab` past the last stop wraps to the first,
/// `Shift-Tab` before the first wraps to the last.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FocusTrap {
    stops: usize,
    current: Option<usize>,
}

impl FocusTrap {
    pub fn new(stops: usize) -> Self {
        Self {
            stops,
            current: None,
        }
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn focus(&mut self, index: usize) -> Option<usize> {
        self.current = (index < self.stops).then_some(index);
        self.current
    }

    pub fn blur(&mut self) {
        self.current = None;
    }

    pub fn next(&mut self) -> Option<usize> {
        if self.stops == 0 {
            return None;
        }
        let next = match self.current {
            Some(index) => (index + 1) % self.stops,
            None => 0,
        };
        self.focus(next)
    }

    pub fn previous(&mut self) -> Option<usize> {
        if self.stops == 0 {
            return None;
        }
        let previous = match self.current {
            Some(0) | None => self.stops - 1,
            Some(index) => index - 1,
        };
        self.focus(previous)
    }
}

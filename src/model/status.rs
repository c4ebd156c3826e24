use std::fmt;

/// Traffic direction currently allowed on the shared lane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Lane is free.
    #[default]
    None,
    /// One or more vehicles are entering.
    Entry,
    /// One or more vehicles are leaving.
    Exit,
}

impl Direction {
    pub fn as_label(self) -> &'static str {
        match self {
            Direction::None => "none",
            Direction::Entry => "entry",
            Direction::Exit => "exit",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Immutable snapshot of the lot, computed on demand.
///
/// ## Field semantics
/// - `occupied + available == capacity` always holds
/// - `waiting`: arrived and still attempting entry
/// - `entered`: successful acquisitions so far
/// - `processed`: vehicles that left or were rejected permanently
/// - `active`: arrived and not yet in a terminal state
/// - `completed`: `processed >= quota && active == 0`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    pub capacity: usize,
    pub occupied: usize,
    pub available: usize,
    pub waiting: u64,
    pub direction: Direction,
    pub entered: u64,
    pub processed: u64,
    pub rejected: u64,
    pub active: u64,
    pub quota: u64,
    pub completed: bool,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} occupied | {} waiting | direction: {} | processed: {}/{}",
            self.occupied, self.capacity, self.waiting, self.direction, self.processed, self.quota
        )?;
        if self.completed {
            f.write_str(" | completed")?;
        }
        Ok(())
    }
}

//! Test and helper mocks for envmon_core

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use envmon_traits::{AnalogInput, BoxError, DigitalOutput};

use crate::report::{Reporter, Snapshot};

/// Analog input replaying a script of results. `cycle` repeats its values
/// forever; `new` returns each result once and then keeps repeating the last
/// successful value (0 if there was none).
pub struct ScriptedAnalog {
    script: VecDeque<Result<u16, BoxError>>,
    repeat: Option<Vec<u16>>,
    pos: usize,
    last: u16,
}

impl ScriptedAnalog {
    pub fn new(script: Vec<Result<u16, BoxError>>) -> Self {
        Self {
            script: script.into(),
            repeat: None,
            pos: 0,
            last: 0,
        }
    }

    pub fn cycle(values: impl IntoIterator<Item = u16>) -> Self {
        Self {
            script: VecDeque::new(),
            repeat: Some(values.into_iter().collect()),
            pos: 0,
            last: 0,
        }
    }
}

impl AnalogInput for ScriptedAnalog {
    fn read_raw(&mut self) -> Result<u16, BoxError> {
        if let Some(values) = &self.repeat
            && !values.is_empty()
        {
            let v = values[self.pos % values.len()];
            self.pos = self.pos.wrapping_add(1);
            return Ok(v);
        }
        match self.script.pop_front() {
            Some(Ok(v)) => {
                self.last = v;
                Ok(v)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last),
        }
    }
}

/// Reporter collecting every snapshot; clone the handle before handing the
/// reporter to a `Monitor`.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    seen: Rc<RefCell<Vec<Snapshot>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.seen.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, snapshot: &Snapshot) {
        self.seen.borrow_mut().push(snapshot.clone());
    }
}

/// Output whose writes always fail; read-back stays low.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingPin;

impl DigitalOutput for FailingPin {
    fn set_level(&mut self, _high: bool) -> Result<(), BoxError> {
        Err(Box::new(std::io::Error::other("pin write rejected")))
    }

    fn is_set_high(&self) -> bool {
        false
    }
}

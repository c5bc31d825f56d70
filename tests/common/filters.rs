//! Filters used to observe and disturb pipelines under test

use cipherpipe::{CipherPipeError, Emitter, Filter, Result};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(String),
    Write(String, Vec<u8>),
    End(String),
}

pub type Journal = Arc<Mutex<Vec<Event>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(journal: &Journal) -> Vec<Event> {
    journal.lock().unwrap().clone()
}

/// Forwards its input and records every call in a shared journal.
pub struct Recorder {
    name: String,
    journal: Journal,
}

impl Recorder {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: Arc::clone(journal),
        }
    }

    fn log(&self, event: Event) {
        self.journal.lock().unwrap().push(event);
    }
}

impl Filter for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, input: &[u8], out: &mut Emitter) -> Result<()> {
        self.log(Event::Write(self.name.clone(), input.to_vec()));
        out.send(input);
        Ok(())
    }

    fn start_message(&mut self, _out: &mut Emitter) -> Result<()> {
        self.log(Event::Start(self.name.clone()));
        Ok(())
    }

    fn end_message(&mut self, _out: &mut Emitter) -> Result<()> {
        self.log(Event::End(self.name.clone()));
        Ok(())
    }
}

/// Buffers a whole message and emits it on `end_message`, followed by a trailer.
#[derive(Default)]
pub struct HoldUntilEnd {
    held: Vec<u8>,
}

impl Filter for HoldUntilEnd {
    fn name(&self) -> &str {
        "HoldUntilEnd"
    }

    fn write(&mut self, input: &[u8], _out: &mut Emitter) -> Result<()> {
        self.held.extend_from_slice(input);
        Ok(())
    }

    fn start_message(&mut self, _out: &mut Emitter) -> Result<()> {
        self.held.clear();
        Ok(())
    }

    fn end_message(&mut self, out: &mut Emitter) -> Result<()> {
        out.send(&self.held);
        out.send_byte(b'.');
        self.held.clear();
        Ok(())
    }
}

/// Fails whenever its input contains `trigger`, or at end of message if asked to.
pub struct Tripwire {
    trigger: u8,
    fail_on_end: bool,
}

impl Tripwire {
    pub fn on_byte(trigger: u8) -> Self {
        Self {
            trigger,
            fail_on_end: false,
        }
    }

    pub fn on_end() -> Self {
        Self {
            trigger: 0,
            fail_on_end: true,
        }
    }
}

impl Filter for Tripwire {
    fn name(&self) -> &str {
        "Tripwire"
    }

    fn write(&mut self, input: &[u8], out: &mut Emitter) -> Result<()> {
        if !self.fail_on_end && input.contains(&self.trigger) {
            return Err(CipherPipeError::filter(self.name(), "tripped"));
        }
        out.send(input);
        Ok(())
    }

    fn end_message(&mut self, _out: &mut Emitter) -> Result<()> {
        if self.fail_on_end {
            return Err(CipherPipeError::filter(self.name(), "tripped at end"));
        }
        Ok(())
    }
}

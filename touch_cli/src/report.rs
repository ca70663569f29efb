//! Gesture reporting: one line per gesture, addressed by topic.
//!
//! With edge reporting on, every release edge is also written as
//! `<topic> released`, ahead of the gestures of the same sample.

use std::io::{self, Write};

use serde_json::json;
use touch_core::runner::Step;
use touch_core::{DecoderOutput, GestureEvent};

pub struct Reporter<W: Write> {
    out: W,
    prefix: String,
    json: bool,
    edges: bool,
    lines: u64,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, prefix: &str, json: bool) -> Self {
        Self {
            out,
            prefix: prefix.to_string(),
            json,
            edges: false,
            lines: 0,
        }
    }

    pub fn with_edges(mut self, edges: bool) -> Self {
        self.edges = edges;
        self
    }

    /// Write one decoder step: release edges when enabled, then gestures.
    ///
    /// Returns the number of gesture lines written.
    pub fn step(&mut self, step: &Step<'_>) -> io::Result<usize> {
        let time_ms = step.sample.time_ms;
        if self.edges && !step.released.is_empty() {
            for ch in step.released {
                self.edge(time_ms, ch)?;
            }
            self.out.flush()?;
        }
        self.report(time_ms, step.output)
    }

    fn edge(&mut self, time_ms: u64, channel: u8) -> io::Result<()> {
        let topic = self.topic(channel);
        if self.json {
            let line = json!({
                "time_ms": time_ms,
                "topic": topic,
                "channel": channel,
                "event": "released",
            });
            writeln!(self.out, "{line}")?;
        } else {
            writeln!(self.out, "{topic} released")?;
        }
        self.lines += 1;
        Ok(())
    }

    /// `<prefix>/touch/<channel>`
    pub fn topic(&self, channel: u8) -> String {
        format!("{}/touch/{channel}", self.prefix)
    }

    /// Write every gesture in `output`; returns how many were written.
    pub fn report(&mut self, time_ms: u64, output: &DecoderOutput) -> io::Result<usize> {
        let mut n = 0;
        for ev in output.events() {
            self.event(time_ms, ev)?;
            n += 1;
        }
        if n > 0 {
            self.out.flush()?;
        }
        Ok(n)
    }

    fn event(&mut self, time_ms: u64, ev: GestureEvent) -> io::Result<()> {
        let topic = self.topic(ev.channel);
        let name = ev.gesture.name();
        let duration = ev.gesture.duration_ms();
        if self.json {
            let line = json!({
                "time_ms": time_ms,
                "topic": topic,
                "channel": ev.channel,
                "gesture": name,
                "duration_ms": duration,
            });
            writeln!(self.out, "{line}")?;
        } else if let Some(d) = duration {
            writeln!(self.out, "{topic} {name} duration_ms={d}")?;
        } else {
            writeln!(self.out, "{topic} {name}")?;
        }
        self.lines += 1;
        Ok(())
    }

    /// Write a free-form summary line, as JSON when in JSON mode.
    pub fn summary(&mut self, text: &str, fields: serde_json::Value) -> io::Result<()> {
        if self.json {
            writeln!(self.out, "{}", json!({ "summary": fields }))?;
        } else {
            writeln!(self.out, "{text}")?;
        }
        self.out.flush()
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

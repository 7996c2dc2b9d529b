//! Action recording and time-travel replay.
//!
//! # Overview
//!
//! A [`replayer::RecordingStore`] wraps the base store and records every
//! dispatched action that has a canonical form:
//! 1. **recording** – the persisted log format (`RecordedAction`)
//! 2. **recorder** – whole-log rewrites and lenient loads (`RecordingLog`)
//! 3. **replayer** – dispatch interception, snapshot cache and rewind
//!
//! A store built with the name of an earlier recording decodes it through the
//! type registry and replays it before handing control back.

pub mod recorder;
pub mod recording;
pub mod replayer;

use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::Result;
use crate::session::SessionResult;

const HEADER: [&str; 6] = ["session", "final_balance", "rounds", "wins", "losses", "resets"];

/// Write one CSV row per session, in the order given.
pub fn write_sessions<W: io::Write>(writer: W, sessions: &[SessionResult]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for (index, session) in sessions.iter().enumerate() {
        let c = &session.counts;
        wtr.write_record(&[
            index.to_string(),
            session.final_balance.to_string(),
            c.rounds.to_string(),
            c.wins.to_string(),
            c.losses.to_string(),
            c.resets.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_sessions_to_path(path: &Path, sessions: &[SessionResult]) -> Result<()> {
    write_sessions(File::create(path)?, sessions)
}

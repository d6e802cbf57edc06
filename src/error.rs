//! Error types shared by the display, terminal and controller layers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("terminal is {cols}x{rows}, need at least {need_cols}x{need_rows}")]
    TerminalTooSmall {
        cols: u16,
        rows: u16,
        need_cols: u16,
        need_rows: u16,
    },
}

//
// Copyright (c) 2017, 2020 ADLINK Technology Inc.
//
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// http://www.eclipse.org/legal/epl-2.0, or the Apache License, Version 2.0
// which is available at https://www.apache.org/licenses/LICENSE-2.0.
//
// SPDX-License-Identifier: EPL-2.0 OR Apache-2.0
//
// Contributors:
//   ADLINK zenoh team, <zenoh@adlink-labs.tech>
//
use std::fmt;

pub type ZResult<T> = Result<T, ZError>;

#[derive(Debug, PartialEq)]
pub enum ZErrorKind {
    BufferOverflow { missing: usize },
    BufferUnderflow { missing: usize },
    InvalidMessage { descr: String },
    InvalidReference { descr: String },
    InvalidResolution { descr: String },
    IoError { descr: String },
    Other { descr: String },
    ZIntOverflow,
}

impl fmt::Display for ZErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZErrorKind::BufferOverflow { missing } => {
                if *missing == 0 {
                    write!(f, "Failed to write in buffer: buffer overflow")
                } else {
                    write!(
                        f,
                        "Failed to write in buffer: buffer overflow ({} bytes missing)",
                        missing
                    )
                }
            }
            ZErrorKind::BufferUnderflow { missing } => {
                if *missing == 0 {
                    write!(f, "Failed to read from buffer: buffer underflow")
                } else {
                    write!(
                        f,
                        "Failed to read from buffer: buffer underflow ({} bytes missing)",
                        missing
                    )
                }
            }
            ZErrorKind::InvalidMessage { descr } => write!(f, "Invalid message ({})", descr),
            ZErrorKind::InvalidReference { descr } => write!(f, "Invalid reference ({})", descr),
            ZErrorKind::InvalidResolution { descr } => {
                write!(f, "Invalid resolution ({})", descr)
            }
            ZErrorKind::IoError { descr } => write!(f, "IO error ({})", descr),
            ZErrorKind::Other { descr } => write!(f, "zenoh error: ({})", descr),
            ZErrorKind::ZIntOverflow => write!(
                f,
                "Failed to read ZInt (too many bytes from buffer for a 64 bits integer)"
            ),
        }
    }
}

#[derive(Debug)]
pub struct ZError {
    kind: ZErrorKind,
    file: &'static str,
    line: u32,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ZError {
    pub fn new(
        kind: ZErrorKind,
        file: &'static str,
        line: u32,
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> ZError {
        ZError {
            kind,
            file,
            line,
            source,
        }
    }

    pub fn get_kind(&self) -> &ZErrorKind {
        &self.kind
    }
}

impl std::error::Error for ZError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.source {
            Some(s) => Some(s.as_ref()),
            None => None,
        }
    }
}

impl fmt::Display for ZError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}.", self.kind, self.file, self.line)?;
        if let Some(s) = &self.source {
            write!(f, " - Caused by {}", *s)?;
        }
        Ok(())
    }
}

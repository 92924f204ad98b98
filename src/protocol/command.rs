//! Command definitions
//!
//! Command codes sent in the first header field of a request.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CommandType {
    Login = 0x001,
    VoidEval = 0x002,
    Eval = 0x003,
    Shutdown = 0x004,
    OpenFile = 0x010,
    CreateFile = 0x011,
    CloseFile = 0x012,
    ReadFile = 0x013,
    WriteFile = 0x014,
    RemoveFile = 0x015,
    SetSexp = 0x020,
    AssignSexp = 0x021,
    /// Ask the server for a larger incoming buffer
    SetBufferSize = 0x081,
}

impl CommandType {
    /// Numeric code as written on the wire
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Map a wire code back to a command
    pub fn from_code(code: u32) -> Option<Self> {
        let command = match code {
            0x001 => CommandType::Login,
            0x002 => CommandType::VoidEval,
            0x003 => CommandType::Eval,
            0x004 => CommandType::Shutdown,
            0x010 => CommandType::OpenFile,
            0x011 => CommandType::CreateFile,
            0x012 => CommandType::CloseFile,
            0x013 => CommandType::ReadFile,
            0x014 => CommandType::WriteFile,
            0x015 => CommandType::RemoveFile,
            0x020 => CommandType::SetSexp,
            0x021 => CommandType::AssignSexp,
            0x081 => CommandType::SetBufferSize,
            _ => return None,
        };
        Some(command)
    }
}

//! Linear step order of each role.

use std::fmt;

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitiatorState {
    Start,
    SendPublicShare,
    AwaitPeerShare,
    DeriveSecret,
    ComposeMessage,
    Pad,
    Substitute,
    Transpose,
    SendCipherText,
    End,
}

impl InitiatorState {
    pub fn next(self) -> Option<Self> {
        use InitiatorState::*;
        match self {
            Start => Some(SendPublicShare),
            SendPublicShare => Some(AwaitPeerShare),
            AwaitPeerShare => Some(DeriveSecret),
            DeriveSecret => Some(ComposeMessage),
            ComposeMessage => Some(Pad),
            Pad => Some(Substitute),
            Substitute => Some(Transpose),
            Transpose => Some(SendCipherText),
            SendCipherText => Some(End),
            End => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        use InitiatorState::*;
        match self {
            Start => "Start",
            SendPublicShare => "SendPublicShare",
            AwaitPeerShare => "AwaitPeerShare",
            DeriveSecret => "DeriveSecret",
            ComposeMessage => "ComposeMessage",
            Pad => "Pad",
            Substitute => "Substitute",
            Transpose => "Transpose",
            SendCipherText => "SendCipherText",
            End => "End",
        }
    }
}

impl fmt::Display for InitiatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderState {
    Start,
    AwaitPeerShare,
    SendPublicShare,
    DeriveSecret,
    AwaitCipherText,
    ReverseTranspose,
    ReverseSubstitute,
    End,
}

impl ResponderState {
    pub fn next(self) -> Option<Self> {
        use ResponderState::*;
        match self {
            Start => Some(AwaitPeerShare),
            AwaitPeerShare => Some(SendPublicShare),
            SendPublicShare => Some(DeriveSecret),
            DeriveSecret => Some(AwaitCipherText),
            AwaitCipherText => Some(ReverseTranspose),
            ReverseTranspose => Some(ReverseSubstitute),
            ReverseSubstitute => Some(End),
            End => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        use ResponderState::*;
        match self {
            Start => "Start",
            AwaitPeerShare => "AwaitPeerShare",
            SendPublicShare => "SendPublicShare",
            DeriveSecret => "DeriveSecret",
            AwaitCipherText => "AwaitCipherText",
            ReverseTranspose => "ReverseTranspose",
            ReverseSubstitute => "ReverseSubstitute",
            End => "End",
        }
    }
}

impl fmt::Display for ResponderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Move `current` to `to` if `to` is its immediate successor.
pub(crate) fn step<S>(current: &mut S, to: S, next: fn(S) -> Option<S>) -> Result<(), SessionError>
where
    S: Copy + PartialEq + fmt::Display,
{
    if next(*current) != Some(to) {
        return Err(SessionError::InvalidTransition {
            from: current.to_string(),
            to: to.to_string(),
        });
    }
    *current = to;
    Ok(())
}

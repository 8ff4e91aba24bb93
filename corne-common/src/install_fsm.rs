// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The corne-flash Authors

//! Install stage FSM - pure ordering logic without side effects.
//!
//! The install is a straight line with one optional detour: the settings
//! reset of both halves. There is no way back to an earlier stage; a failure
//! anywhere ends the run.

use std::fmt;

use crate::bundle::ImageKind;
use crate::flash::Role;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    CheckPrereqs,
    VerifyTools,
    FetchFirmware,
    LocateImages,
    ResetRight,
    ResetLeft,
    FlashLeft,
    FlashRight,
    Done,
}

/// Stages of a full run, in order.
pub const ALL_STAGES: [Stage; 9] = [
    Stage::CheckPrereqs,
    Stage::VerifyTools,
    Stage::FetchFirmware,
    Stage::LocateImages,
    Stage::ResetRight,
    Stage::ResetLeft,
    Stage::FlashLeft,
    Stage::FlashRight,
    Stage::Done,
];

impl Stage {
    /// The stage that follows this one, or `None` after [`Stage::Done`].
    pub fn next(self, skip_reset: bool) -> Option<Stage> {
        match self {
            Stage::CheckPrereqs => Some(Stage::VerifyTools),
            Stage::VerifyTools => Some(Stage::FetchFirmware),
            Stage::FetchFirmware => Some(Stage::LocateImages),
            Stage::LocateImages if skip_reset => Some(Stage::FlashLeft),
            Stage::LocateImages => Some(Stage::ResetRight),
            Stage::ResetRight => Some(Stage::ResetLeft),
            Stage::ResetLeft => Some(Stage::FlashLeft),
            Stage::FlashLeft => Some(Stage::FlashRight),
            Stage::FlashRight => Some(Stage::Done),
            Stage::Done => None,
        }
    }

    /// Half and image written by this stage, if it writes one.
    pub fn flash_target(self) -> Option<(Role, ImageKind)> {
        match self {
            Stage::ResetRight => Some((Role::Right, ImageKind::Reset)),
            Stage::ResetLeft => Some((Role::Left, ImageKind::Reset)),
            Stage::FlashLeft => Some((Role::Left, ImageKind::Left)),
            Stage::FlashRight => Some((Role::Right, ImageKind::Right)),
            _ => None,
        }
    }

    pub fn is_reset(self) -> bool {
        matches!(self, Stage::ResetRight | Stage::ResetLeft)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::CheckPrereqs => "check prerequisites",
            Stage::VerifyTools => "verify tools",
            Stage::FetchFirmware => "fetch firmware",
            Stage::LocateImages => "locate images",
            Stage::ResetRight => "reset right half",
            Stage::ResetLeft => "reset left half",
            Stage::FlashLeft => "flash left half",
            Stage::FlashRight => "flash right half",
            Stage::Done => "done",
        };
        f.write_str(label)
    }
}

/// Every stage a run will pass through, starting at [`Stage::CheckPrereqs`].
pub fn plan(skip_reset: bool) -> Vec<Stage> {
    std::iter::successors(Some(Stage::CheckPrereqs), |stage| stage.next(skip_reset)).collect()
}

// ============================================================
// Layer 2 - Training Run Stages
// ============================================================
// A training run walks these stages strictly in order:
//
//   Idle → Loaded → Split → Built → Trained → Evaluated → Saved → Done
//
// There is no retry or recovery edge: any failure ends the run
// wherever it happened.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Loaded,
    Split,
    Built,
    Trained,
    Evaluated,
    Saved,
    Done,
}

impl Stage {
    /// The stage that follows this one; `Done` is terminal
    pub fn next(self) -> Stage {
        match self {
            Stage::Idle      => Stage::Loaded,
            Stage::Loaded    => Stage::Split,
            Stage::Split     => Stage::Built,
            Stage::Built     => Stage::Trained,
            Stage::Trained   => Stage::Evaluated,
            Stage::Evaluated => Stage::Saved,
            Stage::Saved     => Stage::Done,
            Stage::Done      => Stage::Done,
        }
    }

    #[cfg(test)]
    pub fn is_done(self) -> bool {
        self == Stage::Done
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle      => "idle",
            Stage::Loaded    => "loaded",
            Stage::Split     => "split",
            Stage::Built     => "built",
            Stage::Trained   => "trained",
            Stage::Evaluated => "evaluated",
            Stage::Saved     => "saved",
            Stage::Done      => "done",
        };
        f.write_str(name)
    }
}

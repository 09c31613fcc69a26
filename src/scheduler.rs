//! Poll scheduling state machine. The timer plumbing lives in the panel
//! loop; this module only decides what each transition should poll.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Interval timer armed; periodic polls run.
    Active,
    /// View hidden; timer dropped, no polls until visible again.
    Paused,
}

/// Which endpoints one refresh pass should hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshPlan {
    pub status: bool,
    pub clients: bool,
    pub logs: bool,
}

impl RefreshPlan {
    pub const NONE: Self = Self {
        status: false,
        clients: false,
        logs: false,
    };

    /// The unconditional startup pass: everything, logs included.
    pub const STARTUP: Self = Self {
        status: true,
        clients: true,
        logs: true,
    };

    /// A periodic poll cycle: status and clients. Logs refresh only on
    /// demand or as a dispatch follow-up.
    pub const POLL_CYCLE: Self = Self {
        status: true,
        clients: true,
        logs: false,
    };

    pub const LOGS_ONLY: Self = Self {
        status: false,
        clients: false,
        logs: true,
    };

    pub fn is_empty(&self) -> bool {
        !self.status && !self.clients && !self.logs
    }
}

#[derive(Debug)]
pub struct PollScheduler {
    mode: PollMode,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self {
            mode: PollMode::Active,
        }
    }

    pub fn mode(&self) -> PollMode {
        self.mode
    }

    /// View became hidden: stop polling. The caller drops its timer.
    pub fn on_hidden(&mut self) {
        self.mode = PollMode::Paused;
    }

    /// View became visible: resume with one immediate status/clients poll.
    /// The caller re-arms its timer.
    pub fn on_visible(&mut self) -> RefreshPlan {
        if self.mode == PollMode::Paused {
            self.mode = PollMode::Active;
            RefreshPlan::POLL_CYCLE
        } else {
            RefreshPlan::NONE
        }
    }

    pub fn on_tick(&self) -> RefreshPlan {
        match self.mode {
            PollMode::Active => RefreshPlan::POLL_CYCLE,
            PollMode::Paused => RefreshPlan::NONE,
        }
    }
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new()
    }
}

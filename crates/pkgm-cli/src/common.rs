//! Options shared by every invocation

use clap::Parser;

/// Logging options; they never change the generated manifest
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Only report errors")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: errors only (-q)
    /// - 1: warnings and the final summary
    /// - 2: debug (-v)
    /// - 3: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            pkgm_logger::QUIET
        } else {
            pkgm_logger::NORMAL.saturating_add(self.verbose)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::common::*;

    #[test]
    fn test_quiet_wins_over_verbose() {
        let opts = GlobalOpts {
            quiet: true,
            verbose: 2,
        };
        assert_eq!(opts.verbosity_level(), pkgm_logger::QUIET);
    }

    #[test]
    fn test_verbose_count_raises_level() {
        let opts = GlobalOpts {
            quiet: false,
            verbose: 2,
        };
        assert_eq!(opts.verbosity_level(), pkgm_logger::TRACE);
        assert_eq!(GlobalOpts::default().verbosity_level(), pkgm_logger::NORMAL);
    }
}

pub mod loss_aversion;
pub mod overtrading;
pub mod revenge_trading;

use serde::{Deserialize, Serialize};

use crate::detection::{Bias, DetectionResult, Severity};
use crate::trade_log::TradeLog;

pub use loss_aversion::{detect_loss_aversion, LossAversionMetrics};
pub use overtrading::{detect_overtrading, OvertradingMetrics};
pub use revenge_trading::{detect_revenge_trading, RevengeTradingMetrics};

/// One result per bias, computed once and shared by the report builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasDetections {
    pub overtrading: DetectionResult<OvertradingMetrics>,
    pub loss_aversion: DetectionResult<LossAversionMetrics>,
    pub revenge_trading: DetectionResult<RevengeTradingMetrics>,
}

impl BiasDetections {
    pub fn detect(log: &TradeLog) -> Self {
        BiasDetections {
            overtrading: detect_overtrading(log),
            loss_aversion: detect_loss_aversion(log),
            revenge_trading: detect_revenge_trading(log),
        }
    }

    pub fn is_detected(&self, bias: Bias) -> bool {
        match bias {
            Bias::Overtrading => self.overtrading.detected,
            Bias::LossAversion => self.loss_aversion.detected,
            Bias::RevengeTrading => self.revenge_trading.detected,
        }
    }

    pub fn severity(&self, bias: Bias) -> Severity {
        match bias {
            Bias::Overtrading => self.overtrading.severity,
            Bias::LossAversion => self.loss_aversion.severity,
            Bias::RevengeTrading => self.revenge_trading.severity,
        }
    }

    /// Detected biases in reporting order.
    pub fn detected(&self) -> Vec<Bias> {
        Bias::ALL
            .into_iter()
            .filter(|bias| self.is_detected(*bias))
            .collect()
    }
}

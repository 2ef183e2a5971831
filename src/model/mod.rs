//! Transfer and perceptual-loss collaborators
//!
//! The training loop treats both networks as black-box capability seams:
//! a [`TransferModel`] maps a content batch and a rotation slot to a
//! generated batch, a [`PerceptualScorer`] turns a (content, generated,
//! slot) triple into content/style losses and their gradients. Alternative
//! architectures plug in behind these traits without touching the
//! orchestrator; the reference implementations here are deliberately small.

mod param;
mod perceptual;
mod transfer;

pub use param::Param;
pub use perceptual::{MomentMatchingScorer, PerceptualScore, PerceptualScorer};
pub use transfer::{ChannelAffineTransfer, TransferModel};

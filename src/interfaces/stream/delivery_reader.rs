use crate::application::consumer::Delivery;
use crate::error::{AuthError, Result};
use std::io::BufRead;

/// Reads queue deliveries from a newline-delimited source, one message per
/// non-blank line. Bodies are passed through untouched; decoding happens in
/// the consumer so malformed lines are dead-lettered there.
pub struct DeliveryReader<R: BufRead> {
    source: R,
}

impl<R: BufRead> DeliveryReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn deliveries(self) -> impl Iterator<Item = Result<Delivery>> {
        self.source.lines().filter_map(|line| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(Ok(Delivery::new(line.into_bytes()))),
            Err(e) => Some(Err(AuthError::from(e))),
        })
    }
}

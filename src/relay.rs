//! Streaming Relay
//!
//! Turns a fragment source into client events: one `Content` per non-empty
//! fragment, in source order, then exactly one `Done`. The relay pulls the
//! source only when the consumer asks for the next event, so a slow client
//! stalls generation and a dropped client drops the source.

use crate::generation::TokenStream;
use crate::models::StreamEvent;
use crate::prompt::GENERATION_FAILURE_NOTICE;
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, error};

enum RelayState {
    Streaming { tokens: TokenStream, relayed: usize },
    Closing,
    Finished,
}

pub fn relay(tokens: TokenStream) -> impl Stream<Item = StreamEvent> + Send {
    let initial = RelayState::Streaming { tokens, relayed: 0 };

    stream::unfold(initial, |state| async move {
        match state {
            RelayState::Streaming {
                mut tokens,
                mut relayed,
            } => loop {
                match tokens.next().await {
                    Some(Ok(fragment)) if fragment.is_empty() => continue,
                    Some(Ok(fragment)) => {
                        relayed += 1;
                        return Some((
                            StreamEvent::Content(fragment),
                            RelayState::Streaming { tokens, relayed },
                        ));
                    }
                    Some(Err(e)) => {
                        error!(error = %e, relayed, "Generation stream failed");
                        // Source is dropped here; nothing more is pulled from it
                        if relayed == 0 {
                            return Some((
                                StreamEvent::Content(GENERATION_FAILURE_NOTICE.to_string()),
                                RelayState::Closing,
                            ));
                        }
                        return Some((StreamEvent::Done, RelayState::Finished));
                    }
                    None => {
                        debug!(relayed, "Generation stream complete");
                        return Some((StreamEvent::Done, RelayState::Finished));
                    }
                }
            },
            RelayState::Closing => Some((StreamEvent::Done, RelayState::Finished)),
            RelayState::Finished => None,
        }
    })
}

//! Request tokens for settings loads
//!
//! Every load carries a monotonically increasing ticket. A response is only
//! applied when its ticket is still the latest one issued.

use crate::context::ChannelScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RequestTokens {
    latest: u64,
}

impl RequestTokens {
    /// Issue a new ticket, invalidating every earlier one
    pub fn issue(&mut self) -> LoadTicket {
        self.latest += 1;
        LoadTicket(self.latest)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest
    }
}

/// A load that should be sent to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub store_id: String,
    pub channel_id: String,
}

impl LoadRequest {
    /// Issue a ticket for `scope`; `None` when the scope is incomplete
    ///
    /// The ticket is issued either way so that loads still in flight for the
    /// previous scope are discarded.
    pub fn issue(tokens: &mut RequestTokens, scope: &ChannelScope) -> (LoadTicket, Option<Self>) {
        let ticket = tokens.issue();
        let request = scope.resolved().map(|(store_id, channel_id)| Self {
            ticket,
            store_id: store_id.to_string(),
            channel_id: channel_id.to_string(),
        });
        (ticket, request)
    }
}

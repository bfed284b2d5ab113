// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Checks run on every request before any GraphQL work: authentication, permissions and
//! throttling.

use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::context::ViewRequest;
use crate::error::ViewError;

pub trait RequestGuard: Send + Sync {
    /// Return `Err` with `NotAuthenticated`, `PermissionDenied` or `Throttled` to reject the
    /// request.
    fn check(&self, request: &ViewRequest) -> Result<(), ViewError>;
}

impl<F> RequestGuard for F
where
    F: Fn(&ViewRequest) -> Result<(), ViewError> + Send + Sync,
{
    fn check(&self, request: &ViewRequest) -> Result<(), ViewError> {
        self(request)
    }
}

/// Allowed number of requests per period, written as `"<count>/<period>"` where the period is
/// read from its first letter: `s`econd, `m`inute, `h`our or `d`ay (so `"100/day"` works too).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    pub num_requests: usize,
    pub period: Duration,
}

impl FromStr for Rate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (num_requests, period) = s
            .split_once('/')
            .ok_or_else(|| format!("expected '<count>/<period>', got '{s}'"))?;

        let num_requests = num_requests
            .trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid request count '{num_requests}': {e}"))?;

        let seconds = match period.trim().chars().next() {
            Some('s') => 1,
            Some('m') => 60,
            Some('h') => 60 * 60,
            Some('d') => 24 * 60 * 60,
            _ => return Err(format!("invalid period '{period}'")),
        };

        Ok(Rate {
            num_requests,
            period: Duration::from_secs(seconds),
        })
    }
}

/// What requests are counted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleKey {
    Ip,
    /// The value of a request header, such as an API key.
    Header(String),
}

/// Rejects a client once it has made `rate.num_requests` requests within `rate.period`.
///
/// Requests without a key (no known IP, or the header missing) are not throttled.
pub struct RateThrottle {
    rate: Rate,
    key: ThrottleKey,
    history: Mutex<History>,
}

/// Recent requests per key, newest first. Keys whose requests have all expired are dropped at
/// most once per period.
#[derive(Default)]
struct History {
    requests: HashMap<String, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl History {
    fn sweep(&mut self, now: Instant, period: Duration) {
        let due = self
            .last_sweep
            .is_none_or(|last_sweep| now.saturating_duration_since(last_sweep) >= period);
        if !due {
            return;
        }

        self.requests.retain(|_, requests| {
            expire(requests, now, period);
            !requests.is_empty()
        });
        self.last_sweep = Some(now);
    }
}

fn expire(requests: &mut VecDeque<Instant>, now: Instant, period: Duration) {
    // Oldest requests are at the back.
    while let Some(oldest) = requests.back() {
        if now.saturating_duration_since(*oldest) >= period {
            requests.pop_back();
        } else {
            break;
        }
    }
}

impl RateThrottle {
    pub fn new(rate: Rate, key: ThrottleKey) -> Self {
        Self {
            rate,
            key,
            history: Mutex::new(History::default()),
        }
    }

    fn key_for(&self, request: &ViewRequest) -> Option<String> {
        match &self.key {
            ThrottleKey::Ip => request.ip.map(|ip| ip.to_string()),
            ThrottleKey::Header(name) => request.header(name),
        }
    }

    fn check_at(&self, request: &ViewRequest, now: Instant) -> Result<(), ViewError> {
        let Some(key) = self.key_for(request) else {
            return Ok(());
        };

        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history.sweep(now, self.rate.period);

        let requests = history.requests.entry(key).or_default();
        expire(requests, now, self.rate.period);

        if requests.len() >= self.rate.num_requests {
            let wait = requests
                .back()
                .map(|oldest| {
                    self.rate
                        .period
                        .saturating_sub(now.saturating_duration_since(*oldest))
                })
                .unwrap_or(self.rate.period);

            tracing::debug!(?wait, "Request throttled");
            return Err(ViewError::Throttled {
                wait: Some(ceil_secs(wait)),
            });
        }

        requests.push_front(now);
        Ok(())
    }
}

impl RequestGuard for RateThrottle {
    fn check(&self, request: &ViewRequest) -> Result<(), ViewError> {
        self.check_at(request, Instant::now())
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    if duration.subsec_nanos() > 0 {
        duration.as_secs() + 1
    } else {
        duration.as_secs()
    }
}

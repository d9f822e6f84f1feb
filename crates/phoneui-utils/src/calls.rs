//! Voice calls, USSD requests and the call log.

use tracing::info;

use phoneui_core::names::{self, interface};
use phoneui_core::{Connection, Proxy, QueryDescriptor, QueryOptions, Record, ServiceResult, Value};

use crate::bridge::{CallFuture, discard, require};
use crate::query::{Direction, PimDomain, run_query};

/// Call type passed to `Initiate`.
const VOICE: &str = "voice";

/// Field of call log entries telling whether the call was answered.
pub const ANSWERED_FIELD: &str = "Answered";

/// Whether `number` is a USSD request rather than a dialable number.
///
/// USSD codes start with `*` or `#` and are terminated by `#`.
pub fn is_ussd(number: &str) -> bool {
    number.len() >= 2 && number.starts_with(['*', '#']) && number.ends_with('#')
}

#[derive(Debug, Clone)]
pub struct CallsClient {
    connection: Connection,
}

impl CallsClient {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    fn gsm_call(&self) -> Proxy {
        self.connection.proxy(names::gsm_device(interface::GSM_CALL))
    }

    fn gsm_network(&self) -> Proxy {
        self.connection.proxy(names::gsm_device(interface::GSM_NETWORK))
    }

    // =========================================================================
    // GSM
    // =========================================================================

    /// Starts a voice call; resolves to the new call id.
    pub fn initiate(&self, number: &str) -> ServiceResult<CallFuture<i32>> {
        require("number", number)?;
        info!(number = %number, "Initiating call");
        Ok(self
            .gsm_call()
            .request("Initiate", vec![Value::from(number), Value::from(VOICE)]))
    }

    pub fn release(&self, id: i32) -> CallFuture<()> {
        discard(self.gsm_call(), "Release", vec![Value::from(id)])
    }

    pub fn activate(&self, id: i32) -> CallFuture<()> {
        discard(self.gsm_call(), "Activate", vec![Value::from(id)])
    }

    pub fn send_dtmf(&self, tones: &str) -> ServiceResult<CallFuture<()>> {
        require("tones", tones)?;
        Ok(discard(self.gsm_call(), "SendDtmf", vec![Value::from(tones)]))
    }

    pub fn ussd_initiate(&self, request: &str) -> ServiceResult<CallFuture<()>> {
        require("request", request)?;
        info!(request = %request, "Initiating USSD request");
        Ok(discard(
            self.gsm_network(),
            "SendUssdRequest",
            vec![Value::from(request)],
        ))
    }

    /// Sends a USSD request or starts a voice call, depending on `number`.
    ///
    /// Resolves to the call id, or `0` for USSD requests.
    pub fn dial(&self, number: &str) -> ServiceResult<CallFuture<i32>> {
        if is_ussd(number) {
            let request = self.ussd_initiate(number)?;
            Ok(Box::pin(async move { request.await.map(|()| 0) }))
        } else {
            self.initiate(number)
        }
    }

    // =========================================================================
    // Call log
    // =========================================================================

    pub fn query(&self, options: &QueryOptions, filter: Option<&Record>) -> CallFuture<Vec<Record>> {
        let descriptor = QueryDescriptor::build(options, filter);
        Box::pin(run_query(self.connection.clone(), PimDomain::Calls, descriptor))
    }

    /// Queries the call log, optionally restricted by direction and by
    /// whether the call was answered.
    pub fn get_full(
        &self,
        options: &QueryOptions,
        direction: Option<Direction>,
        answered: Option<bool>,
    ) -> CallFuture<Vec<Record>> {
        let mut filter = Record::new();
        if let Some(direction) = direction {
            filter.insert(Direction::FIELD.into(), direction.into());
        }
        if let Some(answered) = answered {
            filter.insert(ANSWERED_FIELD.into(), Value::Bool(answered));
        }
        self.query(options, Some(&filter))
    }

    /// The most recent calls, newest first. A missing or non-positive
    /// `limit` returns the whole log.
    pub fn get(&self, limit: Option<i32>) -> CallFuture<Vec<Record>> {
        let options = QueryOptions::new()
            .sort_by("Timestamp")
            .descending(true)
            .limit(limit.filter(|&n| n > 0).unwrap_or(-1))
            .resolve_phonenumber(true);
        self.get_full(&options, None, None)
    }

    /// Content of one call log entry.
    pub fn get_call(&self, path: &str) -> ServiceResult<CallFuture<Record>> {
        require("path", path)?;
        Ok(self
            .connection
            .proxy(names::pim_object(path, interface::PIM_CALL))
            .request("GetContent", vec![]))
    }
}

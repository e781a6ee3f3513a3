//! Account, portfolio, position and PnL subscriptions.

use bytes::BytesMut;

use super::RequestEncoder;
use crate::errors::Result;
use crate::models::execution::ExecutionFilter;
use crate::protocol::{outgoing, server_version as sv, NO_VALID_ID};

impl RequestEncoder {
    pub fn req_account_updates(&self, subscribe: bool, acct_code: &str) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::REQ_ACCT_DATA);
        enc.field(2).field(subscribe).field(acct_code);
        enc.finish()
    }

    /// `group` is usually "All"; `tags` a comma-separated tag list.
    pub fn req_account_summary(&self, req_id: i32, group: &str, tags: &str) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::ACCOUNT_SUMMARY, "account summary requests")?;
        let mut enc = self.message(outgoing::REQ_ACCOUNT_SUMMARY);
        enc.field(1).field(req_id).field(group).field(tags);
        enc.finish()
    }

    pub fn cancel_account_summary(&self, req_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::ACCOUNT_SUMMARY, "account summary cancellation")?;
        let mut enc = self.message(outgoing::CANCEL_ACCOUNT_SUMMARY);
        enc.field(1).field(req_id);
        enc.finish()
    }

    pub fn req_account_updates_multi(
        &self,
        req_id: i32,
        account: &str,
        model_code: &str,
        ledger_and_nlv: bool,
    ) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::MODELS_SUPPORT, "account updates multi requests")?;
        let mut enc = self.message(outgoing::REQ_ACCOUNT_UPDATES_MULTI);
        enc.field(1)
            .field(req_id)
            .field(account)
            .field(model_code)
            .field(ledger_and_nlv);
        enc.finish()
    }

    pub fn cancel_account_updates_multi(&self, req_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::MODELS_SUPPORT, "cancel account updates multi request")?;
        let mut enc = self.message(outgoing::CANCEL_ACCOUNT_UPDATES_MULTI);
        enc.field(1).field(req_id);
        enc.finish()
    }

    pub fn req_positions(&self) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::POSITIONS, "positions request")?;
        let mut enc = self.message(outgoing::REQ_POSITIONS);
        enc.field(1);
        enc.finish()
    }

    pub fn cancel_positions(&self) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::POSITIONS, "positions cancellation")?;
        let mut enc = self.message(outgoing::CANCEL_POSITIONS);
        enc.field(1);
        enc.finish()
    }

    pub fn req_positions_multi(&self, req_id: i32, account: &str, model_code: &str) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::MODELS_SUPPORT, "positions multi request")?;
        let mut enc = self.message(outgoing::REQ_POSITIONS_MULTI);
        enc.field(1).field(req_id).field(account).field(model_code);
        enc.finish()
    }

    pub fn cancel_positions_multi(&self, req_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::MODELS_SUPPORT, "cancel positions multi request")?;
        let mut enc = self.message(outgoing::CANCEL_POSITIONS_MULTI);
        enc.field(1).field(req_id);
        enc.finish()
    }

    pub fn req_pnl(&self, req_id: i32, account: &str, model_code: &str) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::PNL, "PnL request")?;
        let mut enc = self.message(outgoing::REQ_PNL);
        enc.field(req_id).field(account).field(model_code);
        enc.finish()
    }

    pub fn cancel_pnl(&self, req_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::PNL, "PnL request")?;
        let mut enc = self.message(outgoing::CANCEL_PNL);
        enc.field(req_id);
        enc.finish()
    }

    pub fn req_pnl_single(
        &self,
        req_id: i32,
        account: &str,
        model_code: &str,
        con_id: i32,
    ) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::PNL, "PnL request")?;
        let mut enc = self.message(outgoing::REQ_PNL_SINGLE);
        enc.field(req_id).field(account).field(model_code).field(con_id);
        enc.finish()
    }

    pub fn cancel_pnl_single(&self, req_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::PNL, "PnL request")?;
        let mut enc = self.message(outgoing::CANCEL_PNL_SINGLE);
        enc.field(req_id);
        enc.finish()
    }

    pub fn req_managed_accts(&self) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::REQ_MANAGED_ACCTS);
        enc.field(1);
        enc.finish()
    }

    pub fn req_family_codes(&self) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::REQ_FAMILY_CODES, "family codes request")?;
        self.message(outgoing::REQ_FAMILY_CODES).finish()
    }

    pub fn req_soft_dollar_tiers(&self, req_id: i32) -> Result<BytesMut> {
        self.require(NO_VALID_ID, sv::SOFT_DOLLAR_TIER, "soft dollar tier request")?;
        let mut enc = self.message(outgoing::REQ_SOFT_DOLLAR_TIERS);
        enc.field(req_id);
        enc.finish()
    }

    pub fn req_executions(&self, req_id: i32, filter: &ExecutionFilter) -> Result<BytesMut> {
        let mut enc = self.message(outgoing::REQ_EXECUTIONS);
        enc.field(3);
        if self.supports(sv::EXECUTION_DATA_CHAIN) {
            enc.field(req_id);
        }
        enc.field(filter.client_id)
            .field(filter.acct_code.as_str())
            .field(filter.time.as_str())
            .field(filter.symbol.as_str())
            .field(filter.sec_type.as_str())
            .field(filter.exchange.as_str())
            .field(filter.side.as_str());
        enc.finish()
    }
}

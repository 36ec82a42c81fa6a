//! Where ONU values come from.
//!
//! The engine reads through [`OnuSource`] so the query logic does not
//! depend on a live agent. The production implementation is
//! [`async_snmp::Client`].

use std::future::Future;

use async_snmp::{Client, Oid, Transport, VarBind};
use futures_util::TryStreamExt;
use log::trace;

use super::value::RawValue;
use crate::error::SnmpError;

/// Read access to an agent's ONU tables.
pub trait OnuSource: Send + Sync {
    /// GET one object.
    fn get(&self, oid: &Oid) -> impl Future<Output = Result<RawValue, SnmpError>> + Send;

    /// WALK a subtree, returning every `(oid, value)` under `root` in agent order.
    fn walk(
        &self,
        root: &Oid,
    ) -> impl Future<Output = Result<Vec<(Oid, RawValue)>, SnmpError>> + Send;
}

impl<T: Transport + 'static> OnuSource for Client<T> {
    async fn get(&self, oid: &Oid) -> Result<RawValue, SnmpError> {
        let vb = Client::get(self, oid).await?;
        trace!("GET {} = {:?}", oid, vb.value);
        RawValue::from_value(&oid.to_string(), &vb.value)
    }

    async fn walk(&self, root: &Oid) -> Result<Vec<(Oid, RawValue)>, SnmpError> {
        let varbinds: Vec<VarBind> = Client::walk(self, root.clone())?.try_collect().await?;
        trace!("WALK {}: {} varbinds", root, varbinds.len());

        let mut rows = Vec::with_capacity(varbinds.len());
        for vb in varbinds {
            if !vb.oid.starts_with(root) {
                continue;
            }
            // End-of-view markers inside a walk carry no row.
            if vb.value.is_exception() {
                continue;
            }
            let value = RawValue::from_value(&vb.oid.to_string(), &vb.value)?;
            rows.push((vb.oid, value));
        }
        Ok(rows)
    }
}

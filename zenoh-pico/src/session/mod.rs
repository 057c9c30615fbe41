//
// Copyright (c) 2017, 2020 ADLINK Technology Inc.
//
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// http://www.eclipse.org/legal/epl-2.0, or the Apache License, Version 2.0
// which is available at https://www.apache.org/licenses/LICENSE-2.0.
//
// SPDX-License-Identifier: EPL-2.0 OR Apache-2.0
//
// Contributors:
//   ADLINK zenoh team, <zenoh@adlink-labs.tech>
//
pub mod defaults;
mod primitives;
mod query;
mod transport;

pub use primitives::*;
pub use query::*;
pub use transport::*;

use crate::proto::ZenohMessage;
use zenoh_util::core::ZResult;

/*************************************/
/*             CALLBACK              */
/*************************************/
pub trait TransportPeerEventHandler: Send + Sync {
    fn handle_message(&self, msg: ZenohMessage) -> ZResult<()>;
    fn closing(&self);
    fn closed(&self);
}

// Define an empty callback for transports nobody listens to
#[derive(Default)]
pub struct DummyTransportPeerEventHandler;

impl TransportPeerEventHandler for DummyTransportPeerEventHandler {
    fn handle_message(&self, _message: ZenohMessage) -> ZResult<()> {
        Ok(())
    }

    fn closing(&self) {}
    fn closed(&self) {}
}

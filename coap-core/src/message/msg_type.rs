// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

/// The CoAP message type field (RFC7252 §3), `T` in the header.
#[derive(Debug, Copy, Eq, PartialEq, Clone)]
pub enum MsgType {
    /// Confirmable: the sender expects an acknowledgement.
    Confirmable = 0,

    /// Non-confirmable: the sender does not expect an acknowledgement.
    NonConfirmable = 1,

    /// Acknowledgement of a Confirmable message, empty or carrying a piggybacked response.
    Acknowledgement = 2,

    /// Reset: the receiver could not process a Confirmable or Non-confirmable message.
    Reset = 3,
}

impl MsgType {
    /// Creates a new `MsgType` from the given value, panicking if the value is invalid.
    pub fn from(tt: u8) -> MsgType {
        MsgType::try_from(tt).expect("invalid message type")
    }

    /// Creates a new `MsgType` from the given value, returning `None` if the value is invalid.
    pub fn try_from(tt: u8) -> Option<MsgType> {
        match tt {
            0 => Some(MsgType::Confirmable),
            1 => Some(MsgType::NonConfirmable),
            2 => Some(MsgType::Acknowledgement),
            3 => Some(MsgType::Reset),
            _ => None,
        }
    }

    /// Returns true if this message type is Non-confirmable.
    pub fn is_non(self) -> bool {
        self == MsgType::NonConfirmable
    }

    /// Returns true if this message type is Confirmable.
    pub fn is_con(self) -> bool {
        self == MsgType::Confirmable
    }

    /// Returns true if this message type is an Acknowledgement.
    pub fn is_ack(self) -> bool {
        self == MsgType::Acknowledgement
    }

    /// Returns true if this message type is a Reset.
    pub fn is_reset(self) -> bool {
        self == MsgType::Reset
    }

    /// Retransmission (§4.2) is only attempted for Confirmable messages.
    pub fn is_retransmittable(self) -> bool {
        self.is_con()
    }
}

impl Default for MsgType {
    fn default() -> Self {
        MsgType::Confirmable
    }
}

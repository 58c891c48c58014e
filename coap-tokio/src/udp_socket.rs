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

use crate::consts::{
    ALL_COAP_DEVICES_HOSTNAME, ALL_COAP_DEVICES_V4, ALL_COAP_DEVICES_V6_LL, ALL_COAP_DEVICES_V6_RL,
};
use coap_core::transport::{DatagramSink, DatagramSource};
use coap_core::Error;
use std::io;
use std::net::{IpAddr, SocketAddr, SocketAddrV4, SocketAddrV6, ToSocketAddrs};
use std::sync::Arc;
use tokio::net::UdpSocket;

/// A non-blocking UDP socket shared between an [`Endpoint`](coap_core::endpoint::Endpoint)'s
/// write half (via [`TokioUdpSocket::sink`]) and [`crate::run`]'s read loop.
#[derive(Debug, Clone)]
pub struct TokioUdpSocket {
    socket: Arc<UdpSocket>,
}

impl TokioUdpSocket {
    /// Analog of [`std::net::UdpSocket::bind`].
    pub async fn bind<A: tokio::net::ToSocketAddrs>(addr: A) -> io::Result<TokioUdpSocket> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(TokioUdpSocket {
            socket: Arc::new(socket),
        })
    }

    /// Upgrades an already-bound [`std::net::UdpSocket`], putting it in non-blocking mode.
    pub fn from_std(socket: std::net::UdpSocket) -> io::Result<TokioUdpSocket> {
        socket.set_nonblocking(true)?;
        Ok(TokioUdpSocket {
            socket: Arc::new(UdpSocket::from_std(socket)?),
        })
    }

    /// The address this socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Resolves `host`:`port`, special-casing [`ALL_COAP_DEVICES_HOSTNAME`] to the three
    /// well-known CoAP multicast addresses (RFC7252 §12.8) instead of a real DNS lookup.
    pub fn lookup_host(host: &str, port: u16) -> io::Result<std::vec::IntoIter<SocketAddr>> {
        if host == ALL_COAP_DEVICES_HOSTNAME {
            Ok(vec![
                SocketAddr::V6(SocketAddrV6::new(
                    ALL_COAP_DEVICES_V6_LL.parse().unwrap(),
                    port,
                    0,
                    0,
                )),
                SocketAddr::V4(SocketAddrV4::new(ALL_COAP_DEVICES_V4.parse().unwrap(), port)),
                SocketAddr::V6(SocketAddrV6::new(
                    ALL_COAP_DEVICES_V6_RL.parse().unwrap(),
                    port,
                    0,
                    0,
                )),
            ]
            .into_iter())
        } else {
            (host, port).to_socket_addrs()
        }
    }

    /// Joins the multicast group `addr`, picking the v4/v6 flavor that matches this
    /// socket's local address.
    pub fn join_multicast(&self, addr: IpAddr) -> io::Result<()> {
        let local_sockaddr = self.local_addr()?;
        match addr {
            IpAddr::V4(addr) => match local_sockaddr.ip() {
                IpAddr::V4(local_addr) => self.socket.join_multicast_v4(addr, local_addr),
                IpAddr::V6(_) => match local_sockaddr {
                    SocketAddr::V6(local_sockaddr) => self
                        .socket
                        .join_multicast_v6(&addr.to_ipv6_mapped(), local_sockaddr.scope_id()),
                    SocketAddr::V4(_) => unreachable!(),
                },
            },
            IpAddr::V6(addr) => match local_sockaddr {
                SocketAddr::V6(local_sockaddr) => {
                    self.socket.join_multicast_v6(&addr, local_sockaddr.scope_id())
                }
                SocketAddr::V4(_) => Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "multicast-addr/local-addr mismatch",
                )),
            },
        }
    }

    /// Leaves the multicast group `addr`, mirroring [`TokioUdpSocket::join_multicast`].
    pub fn leave_multicast(&self, addr: IpAddr) -> io::Result<()> {
        let local_sockaddr = self.local_addr()?;
        match addr {
            IpAddr::V4(addr) => match local_sockaddr.ip() {
                IpAddr::V4(local_addr) => self.socket.leave_multicast_v4(addr, local_addr),
                IpAddr::V6(_) => match local_sockaddr {
                    SocketAddr::V6(local_sockaddr) => self
                        .socket
                        .leave_multicast_v6(&addr.to_ipv6_mapped(), local_sockaddr.scope_id()),
                    SocketAddr::V4(_) => unreachable!(),
                },
            },
            IpAddr::V6(addr) => match local_sockaddr {
                SocketAddr::V6(local_sockaddr) => {
                    self.socket.leave_multicast_v6(&addr, local_sockaddr.scope_id())
                }
                SocketAddr::V4(_) => Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "multicast-addr/local-addr mismatch",
                )),
            },
        }
    }

    /// Resolves once the socket has a datagram ready to read, for use in a `select!` loop.
    pub async fn readable(&self) -> io::Result<()> {
        self.socket.readable().await
    }

    /// Non-blocking receive; returns `Err(WouldBlock)` if nothing is queued.
    pub fn try_recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.socket.try_recv_from(buf)
    }

    /// A cloneable write-half usable as an [`Endpoint`](coap_core::endpoint::Endpoint)'s
    /// [`DatagramSink`].
    pub fn sink(&self) -> TokioDatagramSink {
        TokioDatagramSink {
            socket: self.socket.clone(),
        }
    }
}

impl DatagramSource<SocketAddr> for TokioUdpSocket {
    type Metadata = SocketAddr;
}

/// The write half of a [`TokioUdpSocket`], implementing
/// [`DatagramSink`](coap_core::transport::DatagramSink).
///
/// `put` never blocks: a full send buffer surfaces as [`Error::WouldBlock`] rather than
/// suspending, per the sans-I/O contract.
#[derive(Debug, Clone)]
pub struct TokioDatagramSink {
    socket: Arc<UdpSocket>,
}

impl DatagramSink<SocketAddr> for TokioDatagramSink {
    fn put(&mut self, buffer: &[u8], destination: Option<&SocketAddr>) -> Result<(), Error> {
        let destination = destination.ok_or(Error::InvalidArgument)?;
        match self.socket.try_send_to(buffer, *destination) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(Error::WouldBlock),
            Err(_) => Err(Error::IoError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loopback_pair_exchanges_a_datagram() {
        let a = TokioUdpSocket::bind("127.0.0.1:0").await.unwrap();
        let b = TokioUdpSocket::bind("127.0.0.1:0").await.unwrap();
        let b_addr = b.local_addr().unwrap();

        let mut sink = a.sink();
        sink.put(b"hello", Some(&b_addr)).unwrap();

        b.readable().await.unwrap();
        let mut buf = [0u8; 16];
        let (n, _from) = b.try_recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");
    }

    #[test]
    fn lookup_host_special_cases_all_coap_devices() {
        let addrs: Vec<_> = TokioUdpSocket::lookup_host(ALL_COAP_DEVICES_HOSTNAME, 5683)
            .unwrap()
            .collect();
        assert_eq!(addrs.len(), 3);
        assert!(addrs.iter().any(|a| a.is_ipv4()));
    }
}

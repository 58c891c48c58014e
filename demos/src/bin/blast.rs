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

//! A load-generator: fires a configurable burst of requests at a target endpoint and
//! reports how many completed, succeeded, or were never answered.
//!
//! ```text
//! blast <host:port> [--count N] [--size BYTES] [--interval MS] [--non]
//! ```

use coap_core::handler::{ResponseListener, ResponseView};
use coap_core::message::MsgCode;
use coap_core::{Error, StandardCoapConstants};
use coap_tokio::TokioEndpoint;
use std::cell::RefCell;
use std::net::SocketAddr;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;

struct Args {
    target: SocketAddr,
    count: u32,
    payload_size: usize,
    confirmable: bool,
    interval: Duration,
}

fn parse_args() -> Args {
    let mut args = std::env::args().skip(1);
    let target = args
        .next()
        .expect("usage: blast <host:port> [--count N] [--size BYTES] [--interval MS] [--non]")
        .parse()
        .expect("target must be a socket address, e.g. 127.0.0.1:5683");

    let mut count = 100;
    let mut payload_size = 16;
    let mut confirmable = true;
    let mut interval = Duration::from_millis(50);

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--count" => count = args.next().expect("--count needs a value").parse().unwrap(),
            "--size" => payload_size = args.next().expect("--size needs a value").parse().unwrap(),
            "--interval" => {
                let ms: u64 = args.next().expect("--interval needs a value").parse().unwrap();
                interval = Duration::from_millis(ms);
            }
            "--non" => confirmable = false,
            other => panic!("unrecognized flag {other}"),
        }
    }

    Args { target, count, payload_size, confirmable, interval }
}

#[derive(Default)]
struct Stats {
    sent: u32,
    completed: u32,
    succeeded: u32,
    failed: u32,
}

struct BlastListener {
    stats: Rc<RefCell<Stats>>,
}

impl ResponseListener for BlastListener {
    fn on_response(&mut self, result: Result<ResponseView<'_>, Error>) {
        let mut stats = self.stats.borrow_mut();
        stats.completed += 1;
        match result {
            Ok(view) if view.code.is_success() => stats.succeeded += 1,
            Ok(_) => stats.failed += 1,
            Err(e) => {
                log::debug!("request failed: {:?}", e);
                stats.failed += 1;
            }
        }
    }
}

async fn run(args: Args) -> std::io::Result<()> {
    let endpoint = TokioEndpoint::bind("[::]:0", StandardCoapConstants::default()).await?;
    let driver = endpoint.clone();
    tokio::task::spawn_local(async move {
        let _ = driver.run().await;
    });

    let stats = Rc::new(RefCell::new(Stats::default()));
    let payload = vec![0xAAu8; args.payload_size];

    for _ in 0..args.count {
        let listener = BlastListener { stats: stats.clone() };
        match endpoint.send_request(
            args.confirmable,
            MsgCode::MethodGet,
            args.target,
            &["blast"],
            &[],
            &payload,
            Box::new(listener),
        ) {
            Ok(_) => stats.borrow_mut().sent += 1,
            Err(e) => log::warn!("failed to issue request: {:?}", e),
        }
        tokio::time::sleep(args.interval).await;
    }

    log::info!("all requests issued, waiting for outstanding retransmissions to settle");
    tokio::time::sleep(Duration::from_secs(5)).await;

    let stats = stats.borrow();
    println!(
        "sent={} completed={} succeeded={} failed={} outstanding={}",
        stats.sent,
        stats.completed,
        stats.succeeded,
        stats.failed,
        stats.sent - stats.completed,
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let args = parse_args();
    LocalSet::new().run_until(run(args)).await
}

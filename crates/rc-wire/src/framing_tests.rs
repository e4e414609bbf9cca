// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Ping {
    n: u32,
}

#[tokio::test]
async fn round_trips_through_an_in_memory_pipe() {
    let mut buf = Vec::new();
    write_frame(&mut buf, &Ping { n: 7 }).await.unwrap();

    let mut cursor = std::io::Cursor::new(buf);
    let decoded: Ping = read_frame(&mut cursor).await.unwrap();
    assert_eq!(decoded, Ping { n: 7 });
}

#[tokio::test]
async fn rejects_frame_larger_than_the_limit() {
    let mut cursor = std::io::Cursor::new((MAX_FRAME_LEN + 1).to_be_bytes().to_vec());
    let result: Result<Ping, _> = read_frame(&mut cursor).await;
    assert!(matches!(result, Err(FramingError::TooLarge(_))));
}

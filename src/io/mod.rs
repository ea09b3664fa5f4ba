// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O: media sources, archive export, and dataset upload.

pub mod export;
pub mod media;
pub mod serialization;
pub mod upload;

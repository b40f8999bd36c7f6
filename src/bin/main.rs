// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use sto_ledger_rs::{
    Address, RegistryKey, StIssueParams, StPlatform, StReleaseParams, StRepaymentParams,
    StTransferParams, StoReleaseParams, TrexGateway,
};

/// Security Token Platform - Process offering operation CSV files
///
/// Reads release/sto_release/issue/transfer/repay operations from a CSV
/// file, runs them through the platform, and outputs the resulting token
/// holder snapshots to stdout.
#[derive(Parser, Debug)]
#[command(name = "sto-ledger-rs")]
#[command(about = "A security-token platform that processes offering operation CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: op,symbol,spc,wallet,to,amount,rate,add_permissions,
    /// can_receive_after,can_send_after,kyc_expiry,can_buy
    /// Example: cargo run -- operations.csv > holders.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    // Process operations from CSV
    let (platform, keys) = match process_operations(BufReader::new(file)) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error processing operations: {}", e);
            process::exit(1);
        }
    };

    // Write results to stdout
    if let Err(e) = write_holders(&platform, &keys, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// The CLI acts as the platform owner, so every row is authorized.
const OPERATOR: Address = Address([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01,
]);

const GATEWAY_ADDRESS: Address = Address([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x6a, 0x7e,
]);

/// Raw CSV record matching the input format.
///
/// Fields: `op, symbol, spc, wallet, to, amount, rate, add_permissions,
/// can_receive_after, can_send_after, kyc_expiry, can_buy`
///
/// `wallet` is the investor for issue and the sender for transfer/repay.
/// Permission columns may be left empty; issuance then defaults to an
/// open permission set with a far-future KYC expiry.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    op: String,
    symbol: String,
    spc: Address,
    wallet: Option<Address>,
    to: Option<Address>,
    #[serde(deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    #[serde(deserialize_with = "csv::invalid_option")]
    rate: Option<Decimal>,
    add_permissions: Option<bool>,
    can_receive_after: Option<u64>,
    can_send_after: Option<u64>,
    kyc_expiry: Option<u64>,
    can_buy: Option<bool>,
}

/// A parsed operation; issuance resolves its offering address at
/// processing time.
#[derive(Debug)]
enum Operation {
    Release(StReleaseParams),
    StoRelease(StoReleaseParams),
    Issue(StIssueParams),
    Transfer(StTransferParams),
    Repay(StRepaymentParams),
}

impl CsvRecord {
    /// Converts a CSV record to an operation.
    ///
    /// Returns `None` for unknown operations or missing required fields.
    fn into_operation(self) -> Option<Operation> {
        let add_permissions = self.add_permissions.unwrap_or(true);
        let can_receive_after = self.can_receive_after.unwrap_or(0);
        let can_send_after = self.can_send_after.unwrap_or(0);
        let kyc_expiry = self.kyc_expiry.unwrap_or(u64::MAX);
        let can_buy = self.can_buy.unwrap_or(true);

        match self.op.to_lowercase().as_str() {
            "release" => Some(Operation::Release(StReleaseParams {
                symbol: self.symbol,
                spc_address: self.spc,
            })),
            "sto_release" => Some(Operation::StoRelease(StoReleaseParams {
                symbol: self.symbol,
                spc_address: self.spc,
                rate: self.rate?,
            })),
            "issue" => Some(Operation::Issue(StIssueParams {
                symbol: self.symbol,
                spc_address: self.spc,
                add_permission_list: add_permissions,
                // Resolved against the current offering at processing time.
                sto_address: Address::ZERO,
                investor: self.wallet?,
                amount: self.amount?,
                can_receive_after,
                can_send_after,
                kyc_expiry,
                can_buy_from_sto: can_buy,
            })),
            "transfer" => Some(Operation::Transfer(StTransferParams {
                symbol: self.symbol,
                spc_address: self.spc,
                add_permission_list: add_permissions,
                from: self.wallet?,
                to: self.to?,
                amount: self.amount?,
                can_receive_after,
                can_send_after,
                kyc_expiry,
                can_buy_from_sto: can_buy,
            })),
            "repay" => Some(Operation::Repay(StRepaymentParams {
                symbol: self.symbol,
                spc_address: self.spc,
                from: self.wallet?,
                amount: self.amount?,
            })),
            _ => None,
        }
    }
}

/// Process operations from a CSV reader.
///
/// Streaming: rows run through the platform one at a time. Malformed rows
/// and failed operations are skipped (logged in debug builds), matching
/// the tolerant batch-processing behavior of the CSV surface.
///
/// Returns the platform plus every (issuer, symbol) key seen, in
/// first-appearance order, for snapshot output.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is
/// invalid.
pub fn process_operations<R: Read>(
    reader: R,
) -> Result<(StPlatform, Vec<RegistryKey>), csv::Error> {
    let platform = StPlatform::new(OPERATOR);
    // A fresh platform cannot be already initialized.
    let _ = platform.initialize();
    let _ = platform.set_trex_gateway(OPERATOR, Arc::new(TrexGateway::new(GATEWAY_ADDRESS)));

    let mut keys: Vec<RegistryKey> = Vec::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " issue "
        .flexible(true) // Allow missing trailing fields
        .has_headers(true) // Skip first row as header
        .from_reader(reader);

    for result in rdr.deserialize::<CsvRecord>() {
        match result {
            Ok(record) => {
                let Some(op) = record.into_operation() else {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping invalid operation record");
                    continue;
                };

                let key = match &op {
                    Operation::Release(p) => RegistryKey::new(p.spc_address, p.symbol.clone()),
                    Operation::StoRelease(p) => RegistryKey::new(p.spc_address, p.symbol.clone()),
                    Operation::Issue(p) => RegistryKey::new(p.spc_address, p.symbol.clone()),
                    Operation::Transfer(p) => RegistryKey::new(p.spc_address, p.symbol.clone()),
                    Operation::Repay(p) => RegistryKey::new(p.spc_address, p.symbol.clone()),
                };
                if !keys.contains(&key) {
                    keys.push(key.clone());
                }

                let outcome = match op {
                    Operation::Release(params) => {
                        platform.release(OPERATOR, params).map(|_| ())
                    }
                    Operation::StoRelease(params) => {
                        platform.sto_release(OPERATOR, params).map(|_| ())
                    }
                    Operation::Issue(mut params) => {
                        // The CSV surface always targets the current offering.
                        match platform
                            .get_offerings(&key.symbol, key.spc_address)
                            .last()
                            .map(|value| value.contract_address)
                        {
                            Some(sto_address) => {
                                params.sto_address = sto_address;
                                platform.issue(OPERATOR, params)
                            }
                            None => {
                                #[cfg(debug_assertions)]
                                eprintln!("Skipping issue for {key}: no offering released");
                                continue;
                            }
                        }
                    }
                    Operation::Transfer(params) => platform.transfer(OPERATOR, params),
                    Operation::Repay(params) => platform.repay(OPERATOR, params),
                };

                // Process operation, ignoring errors (silent failure)
                if let Err(_e) = outcome {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping operation for {key}: {_e}");
                }
            }
            Err(_e) => {
                // Skip malformed rows
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {_e}");
                continue;
            }
        }
    }

    Ok((platform, keys))
}

/// Write holder snapshots to a CSV writer.
///
/// Outputs the active holders of every offering touched by the input, in
/// key order then active-set order.
///
/// # CSV Format
///
/// Columns: `symbol, spc_address, wallet_address, balance,
/// can_receive_after, can_send_after, kyc_expiry, can_buy_from_sto,
/// is_revoked`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_holders<W: Write>(
    platform: &StPlatform,
    keys: &[RegistryKey],
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for key in keys {
        for holder in platform.get_token_holders(&key.symbol, key.spc_address) {
            wtr.serialize(&holder)?;
        }
    }

    // Flush to ensure all data is written
    wtr.flush()?;
    Ok(())
}

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

//! Platform public API integration tests.
//!
//! End-to-end coverage of the business operations (release, offer-release,
//! issue, transfer, repay) against the offering ledger, token capability,
//! and registries.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use sto_ledger_rs::{
    Address, ManualClock, StError, StEvent, StIssueParams, StPlatform, StReleaseParams,
    StRepaymentParams, StTransferParams, StoReleaseParams, TrexGateway,
};

const NOW: u64 = 1_700_000_000;
const YESTERDAY: u64 = NOW - 86_400;
const TOMORROW: u64 = NOW + 86_400;
const NEXT_WEEK: u64 = NOW + 7 * 86_400;

fn wallet(n: u64) -> Address {
    Address::from_low_u64(n)
}

fn owner() -> Address {
    wallet(0x1)
}

fn spc() -> Address {
    wallet(0xa)
}

fn alice() -> Address {
    wallet(0x2)
}

fn bob() -> Address {
    wallet(0x3)
}

fn charlie() -> Address {
    wallet(0x4)
}

fn david() -> Address {
    wallet(0x5)
}

fn setup() -> StPlatform {
    let platform = StPlatform::with_clock(owner(), Arc::new(ManualClock::new(NOW)));
    platform.initialize().unwrap();
    platform
        .set_trex_gateway(owner(), Arc::new(TrexGateway::new(wallet(0x6a7e))))
        .unwrap();
    platform
}

/// Releases the token and opens an offering; returns the offering address.
fn release_and_offer(platform: &StPlatform, symbol: &str, spc: Address, rate: Decimal) -> Address {
    platform
        .release(
            owner(),
            StReleaseParams {
                symbol: symbol.to_string(),
                spc_address: spc,
            },
        )
        .unwrap();
    platform
        .sto_release(
            owner(),
            StoReleaseParams {
                symbol: symbol.to_string(),
                spc_address: spc,
                rate,
            },
        )
        .unwrap()
}

fn make_issue(symbol: &str, sto_address: Address, investor: Address, amount: Decimal) -> StIssueParams {
    StIssueParams {
        symbol: symbol.to_string(),
        spc_address: spc(),
        add_permission_list: true,
        sto_address,
        investor,
        amount,
        can_receive_after: NOW,
        can_send_after: NOW,
        kyc_expiry: TOMORROW,
        can_buy_from_sto: true,
    }
}

fn make_transfer(symbol: &str, from: Address, to: Address, amount: Decimal) -> StTransferParams {
    StTransferParams {
        symbol: symbol.to_string(),
        spc_address: spc(),
        add_permission_list: true,
        from,
        to,
        amount,
        can_receive_after: NOW,
        can_send_after: NOW,
        kyc_expiry: NEXT_WEEK,
        can_buy_from_sto: false,
    }
}

fn make_repay(symbol: &str, from: Address, amount: Decimal) -> StRepaymentParams {
    StRepaymentParams {
        symbol: symbol.to_string(),
        spc_address: spc(),
        from,
        amount,
    }
}

// === Issue ===

/// Scenario: issue 1000 at rate 2 credits 2000, raises 2000, one investor.
#[test]
fn issue_at_rate_two_credits_double() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(2));

    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();

    let holders = platform.get_token_holders("TEST_SYMBOL", spc());
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].wallet_address(), alice());
    assert_eq!(holders[0].balance(), dec!(2000));

    let offerings = platform.get_offerings("TEST_SYMBOL", spc());
    assert_eq!(offerings.len(), 1);
    assert_eq!(offerings[0].raised_amount, dec!(2000));
    assert_eq!(offerings[0].sold_tokens_amount, dec!(2000));
    assert_eq!(offerings[0].investor_count, 1);
    assert_eq!(offerings[0].rate, dec!(2));
}

#[test]
fn issue_from_spc_succeeds() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    platform
        .issue(spc(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();
    assert_eq!(platform.get_token_holders("TEST_SYMBOL", spc()).len(), 1);
}

#[test]
fn issue_from_investor_is_rejected() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    let result = platform.issue(alice(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)));
    assert_eq!(result, Err(StError::InvalidExecutor(alice())));
}

/// Scenario: issue with amount 0 fails and creates nothing.
#[test]
fn issue_zero_amount_fails_without_side_effects() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));

    let result = platform.issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), Decimal::ZERO));
    assert_eq!(result, Err(StError::InvalidAmount));

    assert!(platform.get_token_holders("TEST_SYMBOL", spc()).is_empty());
    assert_eq!(platform.get_offerings("TEST_SYMBOL", spc())[0].investor_count, 0);
}

#[test]
fn issue_to_zero_address_fails() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    let result = platform.issue(
        owner(),
        make_issue("TEST_SYMBOL", sto, Address::ZERO, dec!(1000)),
    );
    assert_eq!(
        result,
        Err(StError::InvalidAddress {
            address: Address::ZERO,
            name: "params.walletAddress"
        })
    );
}

#[test]
fn issue_with_expired_kyc_fails() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    let params = StIssueParams {
        kyc_expiry: YESTERDAY,
        ..make_issue("TEST_SYMBOL", sto, alice(), dec!(1000))
    };
    assert_eq!(platform.issue(owner(), params), Err(StError::InvestorKycExpired));
}

#[test]
fn issue_to_ineligible_buyer_fails() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    let params = StIssueParams {
        can_buy_from_sto: false,
        ..make_issue("TEST_SYMBOL", sto, alice(), dec!(1000))
    };
    assert_eq!(
        platform.issue(owner(), params),
        Err(StError::PurchaseUnauthorizedInvestor)
    );
}

#[test]
fn first_issue_without_permission_registration_fails() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    let params = StIssueParams {
        add_permission_list: false,
        ..make_issue("TEST_SYMBOL", sto, alice(), dec!(1000))
    };
    assert_eq!(
        platform.issue(owner(), params),
        Err(StError::InvalidAddress {
            address: Address::ZERO,
            name: "tokenHolder"
        })
    );
}

/// Issues across three symbols under two SPCs stay fully isolated.
#[test]
fn issues_across_symbols_and_issuers_are_isolated() {
    let platform = setup();
    let spc2 = wallet(0xb);

    let sto1 = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    let sto3 = release_and_offer(&platform, "TEST_SYMBOL3", spc(), dec!(2));
    platform
        .release(
            owner(),
            StReleaseParams {
                symbol: "TEST_SYMBOL2".to_string(),
                spc_address: spc2,
            },
        )
        .unwrap();
    let sto2 = platform
        .sto_release(
            owner(),
            StoReleaseParams {
                symbol: "TEST_SYMBOL2".to_string(),
                spc_address: spc2,
                rate: dec!(1),
            },
        )
        .unwrap();

    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto1, alice(), dec!(1000)))
        .unwrap();
    platform
        .issue(
            owner(),
            StIssueParams {
                spc_address: spc2,
                ..make_issue("TEST_SYMBOL2", sto2, alice(), dec!(2000))
            },
        )
        .unwrap();
    platform
        .issue(owner(), make_issue("TEST_SYMBOL3", sto3, alice(), dec!(3000)))
        .unwrap();
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto1, bob(), dec!(4000)))
        .unwrap();
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto1, alice(), dec!(6000)))
        .unwrap();

    let value1 = &platform.get_offerings("TEST_SYMBOL", spc())[0];
    assert_eq!(value1.raised_amount, dec!(11000)); // 1000 + 4000 + 6000
    assert_eq!(value1.investor_count, 2);

    let value2 = &platform.get_offerings("TEST_SYMBOL2", spc2)[0];
    assert_eq!(value2.raised_amount, dec!(2000));
    assert_eq!(value2.investor_count, 1);

    let value3 = &platform.get_offerings("TEST_SYMBOL3", spc())[0];
    assert_eq!(value3.raised_amount, dec!(6000)); // rate 2
    assert_eq!(value3.investor_count, 1);
}

// === Transfer ===

/// Scenario: transfer 500 of the 2000 issued; two investors, raised
/// amount unchanged.
#[test]
fn transfer_splits_balances_and_keeps_aggregates() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(2));
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();

    platform
        .transfer(owner(), make_transfer("TEST_SYMBOL", alice(), bob(), dec!(500)))
        .unwrap();

    let holders = platform.get_token_holders("TEST_SYMBOL", spc());
    assert_eq!(holders.len(), 2);
    let alice_holder = holders
        .iter()
        .find(|h| h.wallet_address() == alice())
        .unwrap();
    let bob_holder = holders.iter().find(|h| h.wallet_address() == bob()).unwrap();
    assert_eq!(alice_holder.balance(), dec!(1500));
    assert_eq!(bob_holder.balance(), dec!(500));

    let value = &platform.get_offerings("TEST_SYMBOL", spc())[0];
    assert_eq!(value.raised_amount, dec!(2000));
    assert_eq!(value.sold_tokens_amount, dec!(2000));
    assert_eq!(value.investor_count, 2);

    // Token balances follow the ledger.
    let tokens = platform.get_security_tokens(spc());
    assert_eq!(tokens[0].total_supply, dec!(2000));
}

#[test]
fn investor_can_execute_own_transfer() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();

    platform
        .transfer(alice(), make_transfer("TEST_SYMBOL", alice(), bob(), dec!(300)))
        .unwrap();
    assert_eq!(platform.get_token_holders("TEST_SYMBOL", spc()).len(), 2);
}

#[test]
fn third_party_cannot_execute_transfer() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();

    let result = platform.transfer(bob(), make_transfer("TEST_SYMBOL", alice(), bob(), dec!(300)));
    assert_eq!(result, Err(StError::InvalidExecutor(bob())));
}

/// Scenario: destination KYC expired; sender balance unchanged.
#[test]
fn transfer_to_expired_kyc_leaves_sender_untouched() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();

    let params = StTransferParams {
        kyc_expiry: YESTERDAY,
        ..make_transfer("TEST_SYMBOL", alice(), bob(), dec!(500))
    };
    assert_eq!(platform.transfer(owner(), params), Err(StError::InvestorKycExpired));

    let holders = platform.get_token_holders("TEST_SYMBOL", spc());
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].balance(), dec!(1000));
}

#[test]
fn transfer_respects_time_gates() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    platform
        .issue(
            owner(),
            StIssueParams {
                can_send_after: TOMORROW,
                ..make_issue("TEST_SYMBOL", sto, alice(), dec!(1000))
            },
        )
        .unwrap();

    // Sender cannot move until its gate opens.
    assert_eq!(
        platform.transfer(owner(), make_transfer("TEST_SYMBOL", alice(), bob(), dec!(100))),
        Err(StError::InvestorStillUnableToSend)
    );

    // Receiver gate blocks even when the sender could move.
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1)))
        .unwrap();
    let params = StTransferParams {
        can_receive_after: TOMORROW,
        ..make_transfer("TEST_SYMBOL", alice(), bob(), dec!(100))
    };
    assert_eq!(
        platform.transfer(owner(), params),
        Err(StError::InvestorStillUnableToReceive)
    );
}

#[test]
fn transfer_exceeding_balance_fails() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();

    let result = platform.transfer(
        owner(),
        make_transfer("TEST_SYMBOL", alice(), bob(), dec!(1001)),
    );
    assert_eq!(result, Err(StError::InsufficientBalance));
}

/// The documented multi-transfer sequence, including the swap-and-pop
/// reorderings:
///   issue 1000 => A: A(1000)
///   A -700-> B: A(300), B(700)
///   A -300-> C: B(700), C(300)
///   C -100-> A: B(700), C(200), A(100)
///   B -700-> D: A(100), C(200), D(700)
#[test]
fn multiple_transfers_follow_removal_then_insertion_order() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();

    platform
        .transfer(owner(), make_transfer("TEST_SYMBOL", alice(), bob(), dec!(700)))
        .unwrap();
    platform
        .transfer(owner(), make_transfer("TEST_SYMBOL", alice(), charlie(), dec!(300)))
        .unwrap();
    platform
        .transfer(
            owner(),
            StTransferParams {
                add_permission_list: false,
                ..make_transfer("TEST_SYMBOL", charlie(), alice(), dec!(100))
            },
        )
        .unwrap();
    platform
        .transfer(owner(), make_transfer("TEST_SYMBOL", bob(), david(), dec!(700)))
        .unwrap();

    let holders = platform.get_token_holders("TEST_SYMBOL", spc());
    let order: Vec<Address> = holders.iter().map(|h| h.wallet_address()).collect();
    assert_eq!(order, vec![alice(), charlie(), david()]);

    let balances: Vec<Decimal> = holders.iter().map(|h| h.balance()).collect();
    assert_eq!(balances, vec![dec!(100), dec!(200), dec!(700)]);

    // Alice kept her issuance-time permission list: the revival transfer
    // opted out of overwriting.
    let alice_holder = &holders[0];
    assert_eq!(alice_holder.can_send_after(), NOW);
    assert_eq!(alice_holder.kyc_expiry(), TOMORROW);
    assert!(alice_holder.can_buy_from_sto());

    let value = &platform.get_offerings("TEST_SYMBOL", spc())[0];
    assert_eq!(value.investor_count, 3);
    assert_eq!(value.raised_amount, dec!(1000));
}

// === Repay ===

/// Scenario: repay the full remaining balance; the holder disappears while
/// sale aggregates stay.
#[test]
fn full_repayment_removes_holder_and_keeps_sold_amount() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(2));
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();
    platform
        .transfer(owner(), make_transfer("TEST_SYMBOL", alice(), bob(), dec!(500)))
        .unwrap();

    platform
        .repay(owner(), make_repay("TEST_SYMBOL", alice(), dec!(1500)))
        .unwrap();

    let holders = platform.get_token_holders("TEST_SYMBOL", spc());
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].wallet_address(), bob());

    let value = &platform.get_offerings("TEST_SYMBOL", spc())[0];
    assert_eq!(value.investor_count, 1);
    assert_eq!(value.sold_tokens_amount, dec!(2000));
    assert_eq!(value.raised_amount, dec!(2000));

    // Burn went through to the token supply.
    assert_eq!(platform.get_security_tokens(spc())[0].total_supply, dec!(500));
}

/// Scenario: three holders at 1000 each; repay 100/1000/700 leaves
/// 900/-/300 and the fully-repaid holder removed via swap-and-pop.
#[test]
fn partial_repayments_across_three_holders() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    for investor in [alice(), bob(), charlie()] {
        platform
            .issue(owner(), make_issue("TEST_SYMBOL", sto, investor, dec!(1000)))
            .unwrap();
    }

    platform
        .repay(owner(), make_repay("TEST_SYMBOL", alice(), dec!(100)))
        .unwrap();
    platform
        .repay(owner(), make_repay("TEST_SYMBOL", bob(), dec!(1000)))
        .unwrap();
    platform
        .repay(owner(), make_repay("TEST_SYMBOL", charlie(), dec!(700)))
        .unwrap();

    let holders = platform.get_token_holders("TEST_SYMBOL", spc());
    // Bob's removal swapped Charlie into his slot.
    let order: Vec<Address> = holders.iter().map(|h| h.wallet_address()).collect();
    assert_eq!(order, vec![alice(), charlie()]);
    assert_eq!(holders[0].balance(), dec!(900));
    assert_eq!(holders[1].balance(), dec!(300));

    let value = &platform.get_offerings("TEST_SYMBOL", spc())[0];
    assert_eq!(value.investor_count, 2);
    assert_eq!(value.raised_amount, dec!(3000));
    assert_eq!(value.sold_tokens_amount, dec!(3000));
}

#[test]
fn investor_cannot_force_own_repayment() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();

    let result = platform.repay(alice(), make_repay("TEST_SYMBOL", alice(), dec!(500)));
    assert_eq!(result, Err(StError::InvalidExecutor(alice())));
}

#[test]
fn excessive_repayment_fails_as_over_burn() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();

    let result = platform.repay(owner(), make_repay("TEST_SYMBOL", alice(), dec!(1001)));
    assert_eq!(result, Err(StError::CannotBurnMoreThanBalance));

    // Nothing moved.
    let holders = platform.get_token_holders("TEST_SYMBOL", spc());
    assert_eq!(holders[0].balance(), dec!(1000));
    assert_eq!(platform.get_security_tokens(spc())[0].total_supply, dec!(1000));
}

// === Lifecycle and configuration ===

#[test]
fn operations_without_offering_fail_with_invalid_sender() {
    let platform = setup();
    platform
        .release(
            owner(),
            StReleaseParams {
                symbol: "TEST_SYMBOL".to_string(),
                spc_address: spc(),
            },
        )
        .unwrap();

    // No sto_release happened; transfer and repay cannot resolve an
    // offering.
    assert!(matches!(
        platform.transfer(owner(), make_transfer("TEST_SYMBOL", alice(), bob(), dec!(1))),
        Err(StError::InvalidSender(_))
    ));
    assert!(matches!(
        platform.repay(owner(), make_repay("TEST_SYMBOL", alice(), dec!(1))),
        Err(StError::InvalidSender(_))
    ));
}

#[test]
fn sequential_offerings_retain_history_and_route_to_latest() {
    let platform = setup();
    let first = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", first, alice(), dec!(1000)))
        .unwrap();

    // Second offering on the same symbol becomes current.
    let second = platform
        .sto_release(
            owner(),
            StoReleaseParams {
                symbol: "TEST_SYMBOL".to_string(),
                spc_address: spc(),
                rate: dec!(3),
            },
        )
        .unwrap();
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", second, bob(), dec!(100)))
        .unwrap();

    let offerings = platform.get_offerings("TEST_SYMBOL", spc());
    assert_eq!(offerings.len(), 2);
    assert_eq!(offerings[0].contract_address, first);
    assert_eq!(offerings[1].contract_address, second);
    assert_eq!(offerings[0].raised_amount, dec!(1000));
    assert_eq!(offerings[1].raised_amount, dec!(300)); // rate 3

    // Holder queries follow the current offering.
    let holders = platform.get_token_holders("TEST_SYMBOL", spc());
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].wallet_address(), bob());
}

#[test]
fn get_security_tokens_tracks_supply_and_pause_state() {
    let platform = setup();
    assert!(platform.get_security_tokens(spc()).is_empty());

    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(1));
    let tokens = platform.get_security_tokens(spc());
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].symbol, "TEST_SYMBOL");
    assert_eq!(tokens[0].total_supply, Decimal::ZERO);
    assert_eq!(tokens[0].treasury_wallet, spc());
    assert!(!tokens[0].frozen);
    assert!(!tokens[0].allowed, "released token starts paused");

    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();
    let tokens = platform.get_security_tokens(spc());
    assert_eq!(tokens[0].total_supply, dec!(1000));
    assert!(tokens[0].allowed, "issuance lifts the pause");

    platform
        .repay(owner(), make_repay("TEST_SYMBOL", alice(), dec!(500)))
        .unwrap();
    assert_eq!(platform.get_security_tokens(spc())[0].total_supply, dec!(500));
}

#[test]
fn events_are_emitted_in_operation_order() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(2));
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();
    platform
        .transfer(owner(), make_transfer("TEST_SYMBOL", alice(), bob(), dec!(500)))
        .unwrap();
    platform
        .repay(owner(), make_repay("TEST_SYMBOL", bob(), dec!(500)))
        .unwrap();

    let events = platform.events().drain();
    assert_eq!(events.len(), 5);
    assert!(matches!(events[0], StEvent::StReleased { .. }));
    assert!(
        matches!(&events[1], StEvent::StoReleased { sto_address, .. } if *sto_address == sto)
    );
    assert!(
        matches!(&events[2], StEvent::StIssued { investor, amount, .. }
            if *investor == alice() && *amount == dec!(1000))
    );
    assert!(
        matches!(&events[3], StEvent::StTransfered { from, to, amount, .. }
            if *from == alice() && *to == bob() && *amount == dec!(500))
    );
    assert!(
        matches!(&events[4], StEvent::StRepayed { from, amount, .. }
            if *from == bob() && *amount == dec!(500))
    );

    // Failed operations emit nothing.
    let _ = platform.issue(owner(), make_issue("TEST_SYMBOL", sto, Address::ZERO, dec!(1)));
    assert!(platform.events().drain().is_empty());
}

/// Conservation: with no outside mint/burn, holder balances sum to the
/// token supply.
#[test]
fn holder_balances_sum_to_total_supply() {
    let platform = setup();
    let sto = release_and_offer(&platform, "TEST_SYMBOL", spc(), dec!(2));
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, alice(), dec!(1000)))
        .unwrap();
    platform
        .issue(owner(), make_issue("TEST_SYMBOL", sto, bob(), dec!(500)))
        .unwrap();
    platform
        .transfer(owner(), make_transfer("TEST_SYMBOL", alice(), charlie(), dec!(700)))
        .unwrap();
    platform
        .repay(owner(), make_repay("TEST_SYMBOL", bob(), dec!(400)))
        .unwrap();

    let holder_sum: Decimal = platform
        .get_token_holders("TEST_SYMBOL", spc())
        .iter()
        .map(|h| h.balance())
        .sum();
    let supply = platform.get_security_tokens(spc())[0].total_supply;
    assert_eq!(holder_sum, supply);
    assert_eq!(supply, dec!(2600)); // 2000 + 1000 - 400
}

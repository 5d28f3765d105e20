//! Bank transfer example
//!
//! Several tellers move money between accounts concurrently. Each transfer
//! locks both accounts with one `MultiGuard`, in whatever order the teller
//! names them, and the total balance never changes.

use anyhow::{bail, Context, Result};
use guarded::{GuardError, Guardable, GuardedCell, MultiGuard};
use std::thread;

#[derive(Debug, Default)]
struct Account {
    owner: String,
    balance: u64,
}

impl Guardable for Account {}

fn transfer(from: &GuardedCell<Account>, to: &GuardedCell<Account>, amount: u64) -> Result<bool> {
    let mut guard = match MultiGuard::checked((from, to)) {
        Ok(guard) => guard,
        Err(GuardError::DuplicateCell { .. }) => return Ok(false),
        Err(err) => return Err(err).context("locking accounts"),
    };
    let (from, to) = guard.get_data_mut().context("guard does not own the accounts")?;
    if from.balance < amount {
        return Ok(false);
    }
    from.balance -= amount;
    to.balance += amount;
    Ok(true)
}

fn main() -> Result<()> {
    println!("Guarded Transfer Example");
    println!("========================");

    let accounts: Vec<GuardedCell<Account>> = ["alice", "bob", "carol", "dave"]
        .into_iter()
        .map(|owner| {
            GuardedCell::new(Account {
                owner: owner.to_string(),
                balance: 1_000,
            })
        })
        .collect();
    let initial: u64 = accounts.iter().map(|account| account.lock().balance).sum();

    let completed = thread::scope(|s| {
        let tellers: Vec<_> = (0..4)
            .map(|teller| {
                let accounts = &accounts;
                s.spawn(move || -> Result<usize> {
                    let mut completed = 0;
                    for round in 0..2_000 {
                        let from = (teller + round) % accounts.len();
                        let to = (teller * 3 + round * 7 + 1) % accounts.len();
                        if transfer(&accounts[from], &accounts[to], (round % 50) as u64)? {
                            completed += 1;
                        }
                    }
                    Ok(completed)
                })
            })
            .collect();

        tellers
            .into_iter()
            .map(|teller| teller.join().map_err(|_| anyhow::anyhow!("teller panicked"))?)
            .sum::<Result<usize>>()
    })?;

    // Snapshot every balance at one instant.
    let snapshot = MultiGuard::new(accounts.iter().collect::<Vec<_>>());
    let balances = snapshot.get_data().context("snapshot does not own the accounts")?;
    let total: u64 = balances.iter().map(|account| account.balance).sum();

    println!("Completed transfers: {completed}");
    for account in &balances {
        println!("  {:<6} {:>5}", account.owner, account.balance);
    }
    println!("Total: {total} (started with {initial})");

    if total != initial {
        bail!("balance drifted from {initial} to {total}");
    }
    Ok(())
}

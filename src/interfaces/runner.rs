use crate::application::engine::PayrollEngine;
use crate::domain::employee::EmployeeUpdate;
use crate::domain::ports::TokenLedger;
use crate::domain::value::Amount;
use crate::error::Result;
use crate::infrastructure::clock::ManualClock;
use crate::infrastructure::ledger::InMemoryTokenLedger;
use crate::interfaces::csv::command_reader::Command;
use tracing::debug;

/// Applies script commands to an engine wired to the simulated ledger and
/// a manual clock.
pub struct ScriptRunner<'a> {
    engine: &'a PayrollEngine,
    ledger: &'a InMemoryTokenLedger,
    clock: &'a ManualClock,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(engine: &'a PayrollEngine, ledger: &'a InMemoryTokenLedger, clock: &'a ManualClock) -> Self {
        Self {
            engine,
            ledger,
            clock,
        }
    }

    pub async fn apply(&self, command: Command) -> Result<()> {
        debug!(?command, "applying command");
        match command {
            Command::Mint { to, amount } => self.ledger.mint(&to, Amount::new(amount)?).await?,
            Command::Approve {
                owner,
                spender,
                amount,
            } => {
                let spender = spender.unwrap_or_else(|| self.engine.config().orchestrator.clone());
                self.ledger.approve(&owner, &spender, amount).await?;
            }
            Command::Register { caller, name } => {
                self.engine.register_company(&caller, &name).await?;
            }
            Command::AddEmployee {
                caller,
                name,
                payout_address,
                destination,
                salary,
            } => {
                self.engine
                    .add_employee(&caller, &name, payout_address, destination, salary)
                    .await?;
            }
            Command::UpdateEmployee {
                caller,
                employee_id,
                name,
                payout_address,
                destination,
                salary,
            } => {
                let update = EmployeeUpdate {
                    name,
                    payout_address,
                    destination,
                    salary,
                    ..Default::default()
                };
                self.engine
                    .update_employee(&caller, employee_id, update)
                    .await?;
            }
            Command::DeactivateEmployee {
                caller,
                employee_id,
            } => self.engine.deactivate_employee(&caller, employee_id).await?,
            Command::AdminDeactivateEmployee {
                caller,
                employee_id,
            } => {
                self.engine
                    .admin_deactivate_employee(&caller, employee_id)
                    .await?
            }
            Command::SetCompanyActive {
                caller,
                company_id,
                active,
            } => {
                self.engine
                    .set_company_active(&caller, company_id, active)
                    .await?;
            }
            Command::DeleteCompany { caller, company_id } => {
                self.engine.delete_company(&caller, company_id).await?;
            }
            Command::TransferCompany {
                caller,
                company_id,
                new_owner,
            } => {
                self.engine
                    .transfer_company_ownership(&caller, company_id, new_owner)
                    .await?;
            }
            Command::Allow {
                caller,
                destination,
            } => self.engine.allow_destination(&caller, destination).await?,
            Command::Disallow {
                caller,
                destination,
            } => self.engine.disallow_destination(&caller, destination).await?,
            Command::Advance { seconds } => {
                self.clock.advance(seconds)?;
            }
            Command::Tick => {
                self.engine.run_once().await?;
            }
            Command::PayNow {
                caller,
                employee_id,
                fee,
            } => {
                self.engine.pay_now(&caller, employee_id, fee).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::PayrollPorts;
    use crate::config::OrchestratorConfig;
    use crate::domain::ports::Clock;
    use crate::domain::value::{Address, DestinationId};
    use crate::error::PayrollError;
    use crate::infrastructure::bridge::BurnMintBridge;
    use crate::infrastructure::in_memory::{
        InMemoryCompanyStore, InMemoryCursorStore, InMemoryEmployeeStore, InMemoryEventLog,
    };
    use std::sync::Arc;

    fn setup() -> (PayrollEngine, InMemoryTokenLedger, ManualClock) {
        let ledger = InMemoryTokenLedger::new();
        let clock = ManualClock::new(0);
        let ports = PayrollPorts {
            companies: Box::new(InMemoryCompanyStore::new()),
            employees: Box::new(InMemoryEmployeeStore::new()),
            cursor: Box::new(InMemoryCursorStore::new()),
            events: Box::new(InMemoryEventLog::new()),
            ledger: Arc::new(ledger.clone()),
            bridge: Box::new(BurnMintBridge::new(ledger.clone(), Address::new("emitter"), 0)),
            clock: Arc::new(clock.clone()),
        };
        let config = OrchestratorConfig {
            pay_interval: 50,
            ..Default::default()
        };
        (PayrollEngine::new(config, ports).unwrap(), ledger, clock)
    }

    #[tokio::test]
    async fn test_script_pays_after_advance_and_tick() {
        let (engine, ledger, clock) = setup();
        let runner = ScriptRunner::new(&engine, &ledger, &clock);
        let acme = Address::new("acme");

        let script = vec![
            Command::Mint {
                to: acme.clone(),
                amount: 1_000,
            },
            Command::Approve {
                owner: acme.clone(),
                spender: None,
                amount: 1_000,
            },
            Command::Register {
                caller: acme.clone(),
                name: "Acme".into(),
            },
            Command::AddEmployee {
                caller: acme.clone(),
                name: "Alice".into(),
                payout_address: Address::new("0xa11ce"),
                destination: DestinationId(0),
                salary: 250,
            },
            Command::Tick,
            Command::Advance { seconds: 50 },
            Command::Tick,
        ];
        for command in script {
            runner.apply(command).await.unwrap();
        }

        assert_eq!(clock.now(), 50);
        assert_eq!(ledger.balance_of(&Address::new("0xa11ce")).await.unwrap(), 250);
        assert_eq!(
            ledger
                .allowance(&acme, &Address::new("orchestrator"))
                .await
                .unwrap(),
            750
        );
        assert_eq!(engine.employee(1).await.unwrap().next_pay_date, 100);
    }

    #[tokio::test]
    async fn test_rejected_command_surfaces_error() {
        let (engine, ledger, clock) = setup();
        let runner = ScriptRunner::new(&engine, &ledger, &clock);
        let result = runner
            .apply(Command::Allow {
                caller: Address::new("acme"),
                destination: DestinationId(9),
            })
            .await;
        assert!(matches!(result, Err(PayrollError::NotOwner)));
    }

    #[tokio::test]
    async fn test_advance_past_end_of_time_is_rejected() {
        let (engine, ledger, clock) = setup();
        let runner = ScriptRunner::new(&engine, &ledger, &clock);
        runner.apply(Command::Advance { seconds: 10 }).await.unwrap();

        let result = runner.apply(Command::Advance { seconds: u64::MAX }).await;
        assert!(matches!(result, Err(PayrollError::InvariantViolation(_))));
        assert_eq!(clock.now(), 10);
    }
}

//! Built-in ArchiMate relationship table.

use super::{CompatibilityRules, RuleTable, TargetSet};
use crate::ElementType::*;
use crate::RelationshipType::*;
use crate::{ElementType, RelationshipType};

enum Targets {
    Any,
    Only(&'static [ElementType]),
}

type Entry = (RelationshipType, Targets);

const WILDCARD_ENTRIES: &[Entry] = &[
    (Association, Targets::Any),
    (Specialization, Targets::Any),
];

const SOURCE_ENTRIES: &[(ElementType, &[Entry])] = &[
    // Strategy
    (
        Capability,
        &[
            (Realization, Targets::Only(&[Goal, Requirement, Outcome, CourseOfAction])),
            (Serving, Targets::Only(&[BusinessActor, BusinessRole])),
            (Composition, Targets::Only(&[Capability])),
            (Aggregation, Targets::Only(&[Capability])),
            (Influence, Targets::Only(&[Goal, Principle, Requirement])),
            (Association, Targets::Any),
        ],
    ),
    (
        CourseOfAction,
        &[
            (Realization, Targets::Only(&[Capability, Goal])),
            (Serving, Targets::Only(&[BusinessActor, BusinessRole])),
            (Composition, Targets::Only(&[CourseOfAction])),
            (Aggregation, Targets::Only(&[CourseOfAction])),
            (Association, Targets::Any),
        ],
    ),
    (
        ValueStream,
        &[
            (Composition, Targets::Only(&[ValueStream])),
            (Aggregation, Targets::Only(&[ValueStream])),
            (Realization, Targets::Only(&[BusinessProcess, BusinessFunction])),
            (Association, Targets::Any),
        ],
    ),
    (
        Resource,
        &[
            (Realization, Targets::Only(&[BusinessObject, DataObject, Artifact])),
            (Composition, Targets::Only(&[Resource])),
            (Aggregation, Targets::Only(&[Resource])),
            (Association, Targets::Any),
        ],
    ),
    // Motivation
    (
        Stakeholder,
        &[
            (Influence, Targets::Only(&[Goal, Driver, Requirement])),
            (Assignment, Targets::Only(&[BusinessActor, BusinessRole])),
            (Association, Targets::Any),
        ],
    ),
    (
        Driver,
        &[
            (Influence, Targets::Only(&[Goal, Assessment, Requirement])),
            (Association, Targets::Any),
        ],
    ),
    (
        Assessment,
        &[
            (Influence, Targets::Only(&[Driver, Goal])),
            (Association, Targets::Any),
        ],
    ),
    (
        Goal,
        &[
            (Realization, Targets::Only(&[Outcome, Capability])),
            (Influence, Targets::Only(&[Goal, Principle, Requirement])),
            (Composition, Targets::Only(&[Goal])),
            (Aggregation, Targets::Only(&[Goal])),
            (Association, Targets::Any),
            (Specialization, Targets::Only(&[Goal])),
        ],
    ),
    (
        Outcome,
        &[
            (Realization, Targets::Only(&[Capability])),
            (Influence, Targets::Only(&[Goal])),
            (Association, Targets::Any),
        ],
    ),
    (
        Principle,
        &[
            (Influence, Targets::Only(&[Goal, Requirement, Constraint])),
            (Association, Targets::Any),
        ],
    ),
    (
        Requirement,
        &[
            (
                Realization,
                Targets::Only(&[
                    ApplicationService,
                    TechnologyService,
                    BusinessService,
                    Capability,
                    CourseOfAction,
                ]),
            ),
            (Influence, Targets::Only(&[Goal, Principle, Requirement])),
            (Composition, Targets::Only(&[Requirement])),
            (Aggregation, Targets::Only(&[Requirement])),
            (Association, Targets::Any),
            (Specialization, Targets::Only(&[Requirement])),
        ],
    ),
    (
        Constraint,
        &[
            (Influence, Targets::Only(&[Goal, Requirement, Principle])),
            (Association, Targets::Any),
        ],
    ),
    // Business
    (
        BusinessActor,
        &[
            (
                Serving,
                Targets::Only(&[BusinessActor, BusinessRole, BusinessProcess, BusinessFunction]),
            ),
            (UsedBy, Targets::Only(&[BusinessProcess, BusinessFunction])),
            (Composition, Targets::Only(&[BusinessActor, BusinessRole])),
            (Aggregation, Targets::Only(&[BusinessActor, BusinessRole])),
            (Assignment, Targets::Only(&[BusinessRole])),
            (Association, Targets::Any),
            (Specialization, Targets::Only(&[BusinessActor])),
        ],
    ),
    (
        BusinessRole,
        &[
            (
                Serving,
                Targets::Only(&[BusinessActor, BusinessRole, BusinessProcess, BusinessFunction]),
            ),
            (UsedBy, Targets::Only(&[BusinessProcess, BusinessFunction])),
            (Composition, Targets::Only(&[BusinessRole])),
            (Aggregation, Targets::Only(&[BusinessRole])),
            (Assignment, Targets::Only(&[BusinessActor])),
            (Association, Targets::Any),
            (Specialization, Targets::Only(&[BusinessRole])),
        ],
    ),
    (
        BusinessCollaboration,
        &[
            (Serving, Targets::Only(&[BusinessProcess, BusinessFunction])),
            (Composition, Targets::Only(&[BusinessActor, BusinessRole])),
            (Aggregation, Targets::Only(&[BusinessActor, BusinessRole])),
            (Association, Targets::Any),
        ],
    ),
    (
        BusinessInterface,
        &[
            (Serving, Targets::Only(&[BusinessActor, BusinessRole, BusinessProcess])),
            (Assignment, Targets::Only(&[BusinessService])),
            (Composition, Targets::Only(&[BusinessActor, BusinessRole])),
            (Association, Targets::Any),
        ],
    ),
    (
        BusinessProcess,
        &[
            (UsedBy, Targets::Only(&[BusinessActor, BusinessRole])),
            (Serving, Targets::Only(&[BusinessActor, BusinessRole])),
            (Access, Targets::Only(&[BusinessObject])),
            (Flow, Targets::Only(&[BusinessProcess, BusinessFunction])),
            (
                Triggering,
                Targets::Only(&[BusinessProcess, BusinessFunction, BusinessEvent]),
            ),
            (Composition, Targets::Only(&[BusinessProcess, BusinessFunction])),
            (Aggregation, Targets::Only(&[BusinessProcess, BusinessFunction])),
            (Association, Targets::Any),
            (Specialization, Targets::Only(&[BusinessProcess])),
        ],
    ),
    (
        BusinessFunction,
        &[
            (UsedBy, Targets::Only(&[BusinessActor, BusinessRole])),
            (Serving, Targets::Only(&[BusinessActor, BusinessRole])),
            (Access, Targets::Only(&[BusinessObject])),
            (Flow, Targets::Only(&[BusinessProcess, BusinessFunction])),
            (
                Triggering,
                Targets::Only(&[BusinessProcess, BusinessFunction, BusinessEvent]),
            ),
            (Composition, Targets::Only(&[BusinessFunction])),
            (Aggregation, Targets::Only(&[BusinessFunction])),
            (Association, Targets::Any),
            (Specialization, Targets::Only(&[BusinessFunction])),
        ],
    ),
    (
        BusinessInteraction,
        &[
            (
                Flow,
                Targets::Only(&[BusinessProcess, BusinessFunction, BusinessInteraction]),
            ),
            (
                Triggering,
                Targets::Only(&[BusinessProcess, BusinessFunction, BusinessEvent]),
            ),
            (Association, Targets::Any),
        ],
    ),
    (
        BusinessEvent,
        &[
            (Triggering, Targets::Only(&[BusinessProcess, BusinessFunction])),
            (Association, Targets::Any),
        ],
    ),
    (
        BusinessService,
        &[
            (Serving, Targets::Only(&[BusinessActor, BusinessRole, BusinessProcess])),
            (
                Realization,
                Targets::Only(&[ApplicationService, BusinessProcess, BusinessFunction]),
            ),
            (Access, Targets::Only(&[BusinessObject])),
            (Composition, Targets::Only(&[BusinessService])),
            (Aggregation, Targets::Only(&[BusinessService])),
            (Association, Targets::Any),
            (Specialization, Targets::Only(&[BusinessService])),
        ],
    ),
    (
        BusinessObject,
        &[
            (
                Access,
                Targets::Only(&[BusinessProcess, BusinessFunction, BusinessService]),
            ),
            (Realization, Targets::Only(&[DataObject])),
            (Composition, Targets::Only(&[BusinessObject])),
            (Aggregation, Targets::Only(&[BusinessObject])),
            (Association, Targets::Any),
        ],
    ),
    (
        BusinessContract,
        &[
            (Access, Targets::Only(&[BusinessProcess, BusinessFunction])),
            (Association, Targets::Any),
        ],
    ),
    (
        BusinessRepresentation,
        &[
            (Access, Targets::Only(&[BusinessObject])),
            (Association, Targets::Any),
        ],
    ),
    // Application
    (
        ApplicationComponent,
        &[
            (Realization, Targets::Only(&[ApplicationService, ApplicationFunction])),
            (UsedBy, Targets::Only(&[ApplicationComponent])),
            (Serving, Targets::Only(&[ApplicationComponent])),
            (Access, Targets::Only(&[DataObject])),
            (Flow, Targets::Only(&[ApplicationComponent])),
            (
                Composition,
                Targets::Only(&[ApplicationComponent, ApplicationInterface, ApplicationFunction]),
            ),
            (
                Aggregation,
                Targets::Only(&[ApplicationComponent, ApplicationInterface, ApplicationFunction]),
            ),
            (Association, Targets::Any),
            (Specialization, Targets::Only(&[ApplicationComponent])),
        ],
    ),
    (
        ApplicationCollaboration,
        &[
            (Composition, Targets::Only(&[ApplicationComponent])),
            (Aggregation, Targets::Only(&[ApplicationComponent])),
            (Association, Targets::Any),
        ],
    ),
    (
        ApplicationInterface,
        &[
            (
                Serving,
                Targets::Only(&[
                    BusinessActor,
                    BusinessRole,
                    BusinessProcess,
                    ApplicationComponent,
                ]),
            ),
            (Assignment, Targets::Only(&[ApplicationService])),
            (Composition, Targets::Only(&[ApplicationComponent])),
            (Association, Targets::Any),
            (Specialization, Targets::Only(&[ApplicationInterface])),
        ],
    ),
    (
        ApplicationService,
        &[
            (
                Serving,
                Targets::Only(&[
                    BusinessProcess,
                    BusinessFunction,
                    BusinessService,
                    ApplicationComponent,
                ]),
            ),
            (Realization, Targets::Only(&[ApplicationComponent, ApplicationFunction])),
            (Access, Targets::Only(&[DataObject])),
            (Composition, Targets::Only(&[ApplicationService])),
            (Aggregation, Targets::Only(&[ApplicationService])),
            (Association, Targets::Any),
            (Specialization, Targets::Only(&[ApplicationService])),
        ],
    ),
    (
        ApplicationFunction,
        &[
            (UsedBy, Targets::Only(&[ApplicationComponent])),
            (Access, Targets::Only(&[DataObject])),
            (Flow, Targets::Only(&[ApplicationFunction])),
            (Triggering, Targets::Only(&[ApplicationFunction, ApplicationEvent])),
            (Composition, Targets::Only(&[ApplicationFunction])),
            (Aggregation, Targets::Only(&[ApplicationFunction])),
            (Association, Targets::Any),
            (Specialization, Targets::Only(&[ApplicationFunction])),
        ],
    ),
    (
        ApplicationProcess,
        &[
            (Access, Targets::Only(&[DataObject])),
            (Flow, Targets::Only(&[ApplicationProcess])),
            (Triggering, Targets::Only(&[ApplicationProcess, ApplicationEvent])),
            (Composition, Targets::Only(&[ApplicationProcess])),
            (Aggregation, Targets::Only(&[ApplicationProcess])),
            (Association, Targets::Any),
        ],
    ),
    (
        ApplicationInteraction,
        &[
            (
                Flow,
                Targets::Only(&[ApplicationProcess, ApplicationFunction, ApplicationInteraction]),
            ),
            (
                Triggering,
                Targets::Only(&[ApplicationProcess, ApplicationFunction, ApplicationEvent]),
            ),
            (Association, Targets::Any),
        ],
    ),
    (
        ApplicationEvent,
        &[
            (Triggering, Targets::Only(&[ApplicationProcess, ApplicationFunction])),
            (Association, Targets::Any),
        ],
    ),
    (
        DataObject,
        &[
            (
                Access,
                Targets::Only(&[
                    ApplicationComponent,
                    ApplicationFunction,
                    ApplicationProcess,
                    ApplicationService,
                ]),
            ),
            (Realization, Targets::Only(&[Artifact])),
            (Composition, Targets::Only(&[DataObject])),
            (Aggregation, Targets::Only(&[DataObject])),
            (Association, Targets::Any),
        ],
    ),
    // Technology & Physical
    (
        Node,
        &[
            (Realization, Targets::Only(&[TechnologyService])),
            (Assignment, Targets::Only(&[SystemSoftware, Artifact, Device])),
            (Composition, Targets::Only(&[Node, Device, SystemSoftware])),
            (Aggregation, Targets::Only(&[Node, Device, SystemSoftware])),
            (Association, Targets::Any),
        ],
    ),
    (
        Device,
        &[
            (Realization, Targets::Only(&[TechnologyService])),
            (Assignment, Targets::Only(&[SystemSoftware, Artifact])),
            (Composition, Targets::Only(&[Device])),
            (Aggregation, Targets::Only(&[Device])),
            (Association, Targets::Any),
        ],
    ),
    (
        SystemSoftware,
        &[
            (Realization, Targets::Only(&[TechnologyService])),
            (Assignment, Targets::Only(&[Node, Device])),
            (Composition, Targets::Only(&[SystemSoftware])),
            (Aggregation, Targets::Only(&[SystemSoftware])),
            (Association, Targets::Any),
        ],
    ),
    (
        TechnologyInterface,
        &[
            (Serving, Targets::Only(&[ApplicationComponent, Node, Device])),
            (Assignment, Targets::Only(&[TechnologyService])),
            (Composition, Targets::Only(&[Node, Device])),
            (Association, Targets::Any),
        ],
    ),
    (
        TechnologyService,
        &[
            (
                Serving,
                Targets::Only(&[ApplicationComponent, ApplicationService, Node, Device]),
            ),
            (Realization, Targets::Only(&[Node, Device, SystemSoftware])),
            (Composition, Targets::Only(&[TechnologyService])),
            (Aggregation, Targets::Only(&[TechnologyService])),
            (Association, Targets::Any),
            (Specialization, Targets::Only(&[TechnologyService])),
        ],
    ),
    (
        Artifact,
        &[
            (Assignment, Targets::Only(&[Node, Device])),
            (Realization, Targets::Only(&[DataObject])),
            (Association, Targets::Any),
        ],
    ),
    // Implementation & Migration
    (
        WorkPackage,
        &[
            (Realization, Targets::Only(&[Deliverable])),
            (Composition, Targets::Only(&[WorkPackage])),
            (Aggregation, Targets::Only(&[WorkPackage])),
            (Association, Targets::Any),
        ],
    ),
    (
        Deliverable,
        &[
            (Realization, Targets::Only(&[Artifact, BusinessObject, DataObject])),
            (Composition, Targets::Only(&[Deliverable])),
            (Aggregation, Targets::Only(&[Deliverable])),
            (Association, Targets::Any),
        ],
    ),
    (
        Plateau,
        &[
            (Composition, Targets::Only(&[Plateau])),
            (Aggregation, Targets::Only(&[Plateau])),
            (Association, Targets::Any),
        ],
    ),
];

fn table(entries: &[Entry]) -> RuleTable {
    entries
        .iter()
        .map(|(rel_type, targets)| {
            let set = match targets {
                Targets::Any => TargetSet::Any,
                Targets::Only(types) => TargetSet::Only(types.iter().copied().collect()),
            };
            (*rel_type, set)
        })
        .collect()
}

pub(super) fn archimate_rules() -> CompatibilityRules {
    let by_source = SOURCE_ENTRIES
        .iter()
        .map(|(source, entries)| (*source, table(entries)))
        .collect();
    CompatibilityRules::new(by_source, table(WILDCARD_ENTRIES))
}

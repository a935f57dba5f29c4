//! Deterministic output returned when no candidate model produced text.

/// Demo policy returned by initial generation when every candidate failed.
pub const FALLBACK_POLICY: &str = "# Insurance Policy Document

## 1. Policy Overview

This policy provides insurance coverage for the named policyholder subject to the terms,
conditions and exclusions set out below. It was produced in demo mode and must be reviewed
by an underwriter before issue.

## 2. Detailed Coverage

- Coverage amount: as stated in the policy schedule
- Coverage type: as selected on the application
- Beneficiaries: as designated by the policyholder

## 3. Terms & Conditions

- Premiums are due on the dates set out in the payment schedule.
- Coverage remains in force while premiums are paid in full.
- Material misstatements on the application may void this policy.

## 4. Exclusions

- Claims arising from intentional self-injury
- Claims arising from participation in criminal acts
- Pre-existing conditions not disclosed on the application

## 5. Premium and Payment Schedule

Premiums are payable monthly or annually as shown in the accompanying pricing quote.
Annual payment includes a 5% discount.

## Important Note

*This is a sample policy generated in demo mode due to API limitations. For actual policy
generation, please ensure your Gemini API has available quota.*

---
**Need Help?** Contact our support team for assistance.
";

/// Marker that labels [`FALLBACK_POLICY`] as degraded output.
pub const DEMO_MODE_NOTICE: &str =
    "This is a sample policy generated in demo mode due to API limitations.";

pub const REFINEMENT_UNAVAILABLE: &str =
    "Unable to refine policy at this time due to API limitations. Please try again later or \
     contact support.";

pub const QUESTION_UNAVAILABLE: &str = "Unable to process your question at this time";
